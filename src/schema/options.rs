/// Attribute name holding type labels unless configured otherwise.
pub const DEFAULT_TYPE_ATTR: &str = "label";

/// Options controlling schema construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Build the node/edge identity → type index maps.
    pub create_type_maps: bool,
    /// Node attribute that carries the node type label.
    pub node_type_attr: String,
    /// Edge attribute that carries the relation label.
    pub edge_type_attr: String,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            create_type_maps: true,
            node_type_attr: DEFAULT_TYPE_ATTR.to_owned(),
            edge_type_attr: DEFAULT_TYPE_ATTR.to_owned(),
        }
    }
}

impl SchemaOptions {
    /// Options for a structural-only schema: no identity → type maps.
    pub fn structural() -> Self {
        Self::default().type_maps(false)
    }

    /// Enables or disables the identity → type maps.
    pub fn type_maps(mut self, enabled: bool) -> Self {
        self.create_type_maps = enabled;
        self
    }

    /// Sets the node type attribute name.
    pub fn node_type_attr(mut self, attr: impl Into<String>) -> Self {
        self.node_type_attr = attr.into();
        self
    }

    /// Sets the edge type attribute name.
    pub fn edge_type_attr(mut self, attr: impl Into<String>) -> Self {
        self.edge_type_attr = attr.into();
        self
    }
}
