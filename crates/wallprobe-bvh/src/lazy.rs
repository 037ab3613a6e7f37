//! Facets paired with a hierarchy that is built on first use.

use tracing::debug;

use crate::build::{BuildParams, BuildStrategy};
use crate::error::Result;
use crate::facet::FacetSet;
use crate::tree::Tree;

/// A [`FacetSet`] owning the hierarchy built over it.
///
/// The tree is built on the first call to [`FacetTree::get_or_build`] and
/// reused until the facets are touched through [`FacetTree::facets_mut`]
/// or the cache is invalidated with [`FacetTree::mark_dirty`].
#[derive(Debug, Clone)]
pub struct FacetTree {
    facets: FacetSet,
    strategy: BuildStrategy,
    params: BuildParams,
    tree: Option<Tree>,
    dirty: bool,
}

impl FacetTree {
    /// Wrap `facets`; fails if `params` are invalid.
    pub fn new(facets: FacetSet, strategy: BuildStrategy, params: BuildParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            facets,
            strategy,
            params,
            tree: None,
            dirty: true,
        })
    }

    /// Build the hierarchy if it is missing or stale, and return it.
    ///
    /// Returns `None` when the facet set is empty.
    pub fn get_or_build(&mut self) -> Option<&Tree> {
        if self.dirty {
            debug!(facets = self.facets.len(), strategy = ?self.strategy, "Rebuilding facet hierarchy");
            self.tree = self.strategy.build(&mut self.facets, &self.params);
            self.dirty = false;
        }
        self.tree.as_ref()
    }

    /// Facets and the current hierarchy, building it if needed.
    pub fn view(&mut self) -> (&FacetSet, Option<&Tree>) {
        self.get_or_build();
        (&self.facets, self.tree.as_ref())
    }

    /// The facets in their current order.
    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    /// Mutable access to the facets; invalidates the hierarchy.
    pub fn facets_mut(&mut self) -> &mut FacetSet {
        self.dirty = true;
        &mut self.facets
    }

    /// Force a rebuild on the next access.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the next access rebuilds the hierarchy.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Build strategy in use.
    pub fn strategy(&self) -> BuildStrategy {
        self.strategy
    }

    /// Leaf size bounds in use.
    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    /// Give the facets back, dropping the hierarchy.
    pub fn into_facets(self) -> FacetSet {
        self.facets
    }
}
