use reqwest::Method;
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

/// oneM2M resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, FromRepr)]
#[repr(i64)]
pub enum ResourceType {
    #[strum(serialize = "ACP")]
    Acp = 1,
    #[strum(serialize = "AE")]
    Ae = 2,
    Container = 3,
    ContentInstance = 4,
    #[strum(serialize = "CSEBase")]
    CseBase = 5,
    Group = 9,
    MgmtObj = 13,
    Node = 14,
    Subscription = 23,
    FlexContainer = 28,
    DeviceInfo = 1007,
}

impl ResourceType {
    pub fn code(self) -> i64 {
        self as i64
    }

    /// The `m2m:` prefixed short name used as the resource's JSON wrapper key
    pub fn short_name(self) -> &'static str {
        match self {
            ResourceType::Acp => "m2m:acp",
            ResourceType::Ae => "m2m:ae",
            ResourceType::Container => "m2m:cnt",
            ResourceType::ContentInstance => "m2m:cin",
            ResourceType::CseBase => "m2m:cb",
            ResourceType::Group => "m2m:grp",
            ResourceType::MgmtObj => "m2m:mgo",
            ResourceType::Node => "m2m:nod",
            ResourceType::Subscription => "m2m:sub",
            ResourceType::FlexContainer => "m2m:fcnt",
            ResourceType::DeviceInfo => "m2m:dvi",
        }
    }
}

/// Result content (`rcn`) values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[strum(serialize_all = "camelCase")]
#[repr(i64)]
pub enum ResultContent {
    Nothing = 0,
    Attributes = 1,
    HierarchicalAddress = 2,
    HierarchicalAddressAttributes = 3,
    AttributesAndChildResources = 4,
    AttributesAndChildResourceReferences = 5,
    ChildResourceReferences = 6,
    OriginalResource = 7,
    ChildResources = 8,
    ModifiedAttributes = 9,
    DiscoveryResultReferences = 11,
}

/// Access control operation flags, combined as a bit mask in `acop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(i64)]
pub enum AccessControlOperation {
    None = 0,
    Create = 1,
    Retrieve = 2,
    Update = 4,
    Delete = 8,
    Notify = 16,
    Discovery = 32,
    All = 63,
}

impl AccessControlOperation {
    pub fn mask(operations: &[AccessControlOperation]) -> i64 {
        operations.iter().fold(0, |acc, op| acc | *op as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[strum(serialize_all = "camelCase")]
#[repr(i64)]
pub enum FilterUsage {
    DiscoveryCriteria = 1,
    ConditionalRetrieval = 2,
    IpeOnDemandDiscovery = 3,
}

macro_rules! impl_code {
    ($($ty:ty),*) => {
        $(impl From<$ty> for i64 {
            fn from(value: $ty) -> i64 {
                value as i64
            }
        })*
    };
}

impl_code!(ResourceType, ResultContent, AccessControlOperation, FilterUsage);

/// The four oneM2M operations this helper issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Retrieve,
    Update,
    Delete,
}

impl Operation {
    pub fn http_method(self) -> Method {
        match self {
            Operation::Create => Method::POST,
            Operation::Retrieve => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    pub fn requires_content(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }

    pub fn requires_resource_type(self) -> bool {
        matches!(self, Operation::Create)
    }
}
