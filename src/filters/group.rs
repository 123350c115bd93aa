// Filter group tree: a local AND-set plus child groups combined by OR
use serde::{Deserialize, Serialize};

use super::types::{
    GenomeFilter, LineageFilter, ProfileFilter, PropertyFilter, RepliconFilter,
};

/// Filters combined by logical AND within one group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndFilters {
    #[serde(default)]
    pub property_filters: Vec<PropertyFilter>,
    #[serde(default)]
    pub profile_filters: Vec<ProfileFilter>,
    #[serde(default)]
    pub replicon_filters: Vec<RepliconFilter>,
    #[serde(default)]
    pub lineage_filter: LineageFilter,
}

impl AndFilters {
    /// Add a filter to its list. A lineage filter replaces the current one.
    pub fn push(&mut self, filter: impl Into<GenomeFilter>) {
        match filter.into() {
            GenomeFilter::Property(f) => self.property_filters.push(f),
            GenomeFilter::Profile(f) => self.profile_filters.push(f),
            GenomeFilter::Replicon(f) => self.replicon_filters.push(f),
            GenomeFilter::Lineage(f) => self.lineage_filter = f,
        }
    }

    /// Number of filters held, counting the lineage filter only when it has lineages
    pub fn len(&self) -> usize {
        self.property_filters.len()
            + self.profile_filters.len()
            + self.replicon_filters.len()
            + usize::from(self.lineage_filter.is_active())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Node of the filter tree.
///
/// The tree is plain caller-owned data; compilation only borrows it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    /// UI selection marker, ignored by compilation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub marked: bool,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default)]
    pub filters: AndFilters,
}

impl FilterGroup {
    /// Starting tree of a fresh session: an empty date range on
    /// `default_property` and one empty profile filter
    pub fn initial(default_property: &str) -> Self {
        Self {
            marked: false,
            filter_groups: Vec::new(),
            filters: AndFilters {
                property_filters: vec![PropertyFilter::empty_date_range(default_property)],
                profile_filters: vec![ProfileFilter::notation("")],
                replicon_filters: Vec::new(),
                lineage_filter: LineageFilter::default(),
            },
        }
    }

    pub fn with_filter(mut self, filter: impl Into<GenomeFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.filter_groups.push(group);
        self
    }

    /// Append an empty OR-group and return it for editing
    pub fn add_group(&mut self) -> &mut FilterGroup {
        self.filter_groups.push(FilterGroup::default());
        let last = self.filter_groups.len() - 1;
        &mut self.filter_groups[last]
    }

    pub fn remove_group(&mut self, index: usize) -> Option<FilterGroup> {
        if index < self.filter_groups.len() {
            Some(self.filter_groups.remove(index))
        } else {
            None
        }
    }

    /// Descend by child indices; the empty path is this node
    pub fn group_at_mut(&mut self, path: &[usize]) -> Option<&mut FilterGroup> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self.filter_groups.get_mut(index)?.group_at_mut(rest),
        }
    }

    /// Rewrite every property filter's operator to what its value implies.
    /// This is the commit step for date edits; compilation never mutates.
    pub fn normalize_date_ranges(&mut self) {
        for filter in &mut self.filters.property_filters {
            *filter = filter.normalized();
        }
        for group in &mut self.filter_groups {
            group.normalize_date_ranges();
        }
    }

    /// Filters held in this node and all descendants
    pub fn filter_count(&self) -> usize {
        self.filters.len()
            + self
                .filter_groups
                .iter()
                .map(FilterGroup::filter_count)
                .sum::<usize>()
    }

    /// Nesting depth, 1 for a leaf
    pub fn depth(&self) -> usize {
        1 + self
            .filter_groups
            .iter()
            .map(FilterGroup::depth)
            .max()
            .unwrap_or(0)
    }
}
