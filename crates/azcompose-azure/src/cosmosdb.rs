//! Cosmos DB accounts.

use azcompose_core::{Input, Output, PropertyMap, PropertyValue, ResourceKind};

schema_enum! {
    /// Offer type of a database account.
    DatabaseAccountOfferType {
        /// The only offer the service accepts.
        Standard => "Standard",
    }
}

schema_enum! {
    /// Default read consistency.
    DefaultConsistencyLevel {
        /// Eventual.
        Eventual => "Eventual",
        /// Session.
        Session => "Session",
        /// Bounded staleness.
        BoundedStaleness => "BoundedStaleness",
        /// Strong.
        Strong => "Strong",
        /// Consistent prefix.
        ConsistentPrefix => "ConsistentPrefix",
    }
}

/// A replica region of an account.
#[derive(Debug, Clone)]
pub struct Location {
    /// Region name.
    pub location_name: String,
    /// Failover order, 0 for the write region.
    pub failover_priority: u32,
}

impl From<Location> for PropertyValue {
    fn from(location: Location) -> Self {
        PropertyMap::new()
            .with("locationName", location.location_name)
            .with("failoverPriority", location.failover_priority)
            .into()
    }
}

/// Arguments for a Cosmos DB account.
#[derive(Debug, Clone)]
pub struct DatabaseAccountArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    consistency: DefaultConsistencyLevel,
    locations: Vec<Location>,
}

impl DatabaseAccountArgs {
    /// A session-consistent account in the given resource group.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            consistency: DefaultConsistencyLevel::Session,
            locations: Vec::new(),
        }
    }

    /// Azure region of the account resource.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Default read consistency.
    #[must_use]
    pub const fn consistency(mut self, level: DefaultConsistencyLevel) -> Self {
        self.consistency = level;
        self
    }

    /// Adds a replica region.
    #[must_use]
    pub fn replica(mut self, location_name: impl Into<String>, failover_priority: u32) -> Self {
        self.locations.push(Location {
            location_name: location_name.into(),
            failover_priority,
        });
        self
    }
}

impl ResourceKind for DatabaseAccountArgs {
    type Handle = DatabaseAccount;
    const TYPE: &'static str = "azure-native:documentdb:DatabaseAccount";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("databaseAccountOfferType", DatabaseAccountOfferType::Standard)
            .with(
                "consistencyPolicy",
                PropertyMap::new().with("defaultConsistencyLevel", self.consistency),
            )
            .with("locations", self.locations)
    }
}

resource_handle! {
    /// A declared Cosmos DB account.
    DatabaseAccount
}

impl DatabaseAccount {
    /// Document endpoint URL.
    #[must_use]
    pub fn document_endpoint(&self) -> Output<String> {
        self.0.output("documentEndpoint")
    }
}
