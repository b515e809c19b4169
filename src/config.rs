//! Options of the succession diagram analysis

/// Default maximal number of nodes for the partial state transition graph search
pub const DEFAULT_MAX_STG_SIZE: usize = 30;

/// A configuration object for the analysis of a single reduced network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReductionConfig {
    /// Search complex attractors avoiding all stable motifs when the terminal status is
    /// not decided by the motifs alone (default: true).
    pub search_partial_stgs: bool,
    /// Merge the stable motifs of source nodes into combined motifs at the root of the
    /// diagram (default: true).
    pub prioritize_source_motifs: bool,
    /// Maximal number of nodes of a reduced network for the partial state transition graph
    /// search. Larger networks are reported as size-limited.
    pub max_stg_size: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig::new()
    }
}

impl ReductionConfig {
    pub fn new() -> ReductionConfig {
        ReductionConfig {
            search_partial_stgs: true,
            prioritize_source_motifs: true,
            max_stg_size: DEFAULT_MAX_STG_SIZE,
        }
    }

    /// Update the maximal size of the partial state transition graph search
    pub fn with_max_stg_size(mut self, max_stg_size: usize) -> Self {
        self.max_stg_size = max_stg_size;
        self
    }

    /// Enable or disable the merging of source motifs
    pub fn with_source_merging(mut self, enabled: bool) -> Self {
        self.prioritize_source_motifs = enabled;
        self
    }

    /// Enable or disable the partial state transition graph search
    pub fn with_stg_search(mut self, enabled: bool) -> Self {
        self.search_partial_stgs = enabled;
        self
    }
}

/// A configuration object for building a succession diagram.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuccessionConfig {
    /// Options applied to each reduced network of the diagram
    pub reduction: ReductionConfig,
}

impl From<ReductionConfig> for SuccessionConfig {
    fn from(value: ReductionConfig) -> Self {
        SuccessionConfig { reduction: value }
    }
}

impl SuccessionConfig {
    pub fn new() -> SuccessionConfig {
        SuccessionConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SuccessionConfig::new();
        assert!(config.reduction.search_partial_stgs);
        assert!(config.reduction.prioritize_source_motifs);
        assert_eq!(config.reduction.max_stg_size, 30);

        let config = SuccessionConfig::from(
            ReductionConfig::new()
                .with_max_stg_size(12)
                .with_source_merging(false),
        );
        assert_eq!(config.reduction.max_stg_size, 12);
        assert!(!config.reduction.prioritize_source_motifs);
        assert!(config.reduction.search_partial_stgs);
    }
}
