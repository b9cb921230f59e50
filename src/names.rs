//! oneM2M long name / short name translation and display annotations.
//!
//! oneM2M serializes attribute names in a compact short form (`rn`, `lbl`,
//! `acpi`, ...). Operators prefer writing and reading the long form, so
//! request bodies and filter criteria are translated to short names before
//! sending and rendered output is annotated with the long names.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::types::ResourceType;

const NAMES: &[(&str, &str)] = &[
    // common and universal attributes
    ("resourceName", "rn"),
    ("resourceType", "ty"),
    ("resourceID", "ri"),
    ("parentID", "pi"),
    ("creationTime", "ct"),
    ("lastModifiedTime", "lt"),
    ("expirationTime", "et"),
    ("labels", "lbl"),
    ("accessControlPolicyIDs", "acpi"),
    ("announceTo", "at"),
    ("announcedAttribute", "aa"),
    ("stateTag", "st"),
    ("creator", "cr"),
    ("dynamicAuthorizationConsultationIDs", "daci"),
    // AE
    ("appName", "apn"),
    ("App-ID", "api"),
    ("AE-ID", "aei"),
    ("pointOfAccess", "poa"),
    ("ontologyRef", "or"),
    ("nodeLink", "nl"),
    ("requestReachability", "rr"),
    ("contentSerialization", "csz"),
    ("e2eSecInfo", "esi"),
    ("supportedReleaseVersions", "srv"),
    // container and contentInstance
    ("maxNrOfInstances", "mni"),
    ("maxByteSize", "mbs"),
    ("maxInstanceAge", "mia"),
    ("currentNrOfInstances", "cni"),
    ("currentByteSize", "cbs"),
    ("locationID", "li"),
    ("disableRetrieval", "disr"),
    ("contentInfo", "cnf"),
    ("contentSize", "cs"),
    ("content", "con"),
    ("contentRef", "conr"),
    // flexContainer
    ("containerDefinition", "cnd"),
    // subscription
    ("notificationURI", "nu"),
    ("eventNotificationCriteria", "enc"),
    ("notificationContentType", "nct"),
    ("notificationEventType", "net"),
    ("expirationCounter", "exc"),
    ("subscriberURI", "su"),
    ("latestNotify", "ln"),
    ("notificationEventCat", "nec"),
    ("batchNotify", "bn"),
    ("rateLimit", "rl"),
    // group
    ("memberType", "mt"),
    ("currentNrOfMembers", "cnm"),
    ("maxNrOfMembers", "mnm"),
    ("memberIDs", "mid"),
    ("membersAccessControlPolicyIDs", "macp"),
    ("memberTypeValidated", "mtv"),
    ("consistencyStrategy", "csy"),
    ("groupName", "gn"),
    // accessControlPolicy
    ("privileges", "pv"),
    ("selfPrivileges", "pvs"),
    ("accessControlRules", "acr"),
    ("accessControlOriginators", "acor"),
    ("accessControlOperations", "acop"),
    ("accessControlContexts", "acco"),
    ("accessControlAuthenticationFlag", "acaf"),
    // CSEBase, node and management objects
    ("CSE-ID", "csi"),
    ("cseType", "cst"),
    ("nodeID", "ni"),
    ("hostedCSELink", "hcl"),
    ("mgmtDefinition", "mgd"),
    ("objectIDs", "obis"),
    ("objectPaths", "obps"),
    ("description", "dc"),
    ("deviceLabel", "dlb"),
    ("manufacturer", "man"),
    ("model", "mod"),
    ("deviceType", "dty"),
    ("fwVersion", "fwv"),
    ("swVersion", "swv"),
    ("hwVersion", "hwv"),
    // filter criteria
    ("createdBefore", "crb"),
    ("createdAfter", "cra"),
    ("modifiedSince", "ms"),
    ("unmodifiedSince", "us"),
    ("stateTagSmaller", "sts"),
    ("stateTagBigger", "stb"),
    ("expireBefore", "exb"),
    ("expireAfter", "exa"),
    ("childLabels", "clbl"),
    ("parentLabels", "palb"),
    ("childResourceType", "chty"),
    ("parentResourceType", "pty"),
    ("sizeAbove", "sza"),
    ("sizeBelow", "szb"),
    ("contentType", "cty"),
    ("limit", "lim"),
    ("attribute", "atr"),
    ("filterUsage", "fu"),
    ("filterOperation", "fo"),
    ("contentFilterSyntax", "cfs"),
    ("contentFilterQuery", "cfq"),
    ("level", "lvl"),
    ("offset", "ofst"),
    ("applyRelativePath", "arp"),
    ("geoQuery", "gq"),
    ("semanticsFilter", "smf"),
    // request and response primitives
    ("from", "fr"),
    ("operation", "op"),
    ("requestIdentifier", "rqi"),
    ("releaseVersionIndicator", "rvi"),
    ("resultContent", "rcn"),
    ("responseStatusCode", "rsc"),
    ("primitiveContent", "pc"),
    ("filterCriteria", "fc"),
    ("originatingTimestamp", "ot"),
    ("requestExpirationTimestamp", "rqet"),
    ("resultExpirationTimestamp", "rset"),
    ("resultPersistence", "rp"),
    ("discoveryResultType", "drt"),
    ("vendorInformation", "vsi"),
    ("debugInformation", "dbg"),
];

const HEADER_PARAMETERS: &[(&str, &str)] = &[
    ("X-M2M-Origin", "From (fr)"),
    ("X-M2M-RI", "Request Identifier (rqi)"),
    ("X-M2M-RVI", "Release Version Indicator (rvi)"),
    ("X-M2M-RSC", "Response Status Code (rsc)"),
    ("X-M2M-OT", "Originating Timestamp (ot)"),
    ("X-M2M-RET", "Request Expiration Timestamp (rqet)"),
    ("X-M2M-RST", "Result Expiration Timestamp (rset)"),
    ("X-M2M-OET", "Operation Execution Time (oet)"),
    ("X-M2M-EC", "Event Category (ec)"),
    ("X-M2M-RTU", "Notification URI (rtu)"),
    ("X-M2M-UTCMD", "Upper Tester Command"),
    ("Content-Type", "Resource Type (ty)"),
    ("Content-Location", "Resource Address"),
];

const STATUS_CODES: &[(i64, &str)] = &[
    (1000, "ACCEPTED"),
    (2000, "OK"),
    (2001, "CREATED"),
    (2002, "DELETED"),
    (2004, "UPDATED"),
    (4000, "BAD_REQUEST"),
    (4004, "NOT_FOUND"),
    (4005, "OPERATION_NOT_ALLOWED"),
    (4008, "REQUEST_TIMEOUT"),
    (4015, "UNSUPPORTED_MEDIA_TYPE"),
    (4101, "SUBSCRIPTION_CREATOR_HAS_NO_PRIVILEGE"),
    (4102, "CONTENTS_UNACCEPTABLE"),
    (4103, "ORIGINATOR_HAS_NO_PRIVILEGE"),
    (4105, "CONFLICT"),
    (5000, "INTERNAL_SERVER_ERROR"),
    (5001, "NOT_IMPLEMENTED"),
    (5103, "TARGET_NOT_REACHABLE"),
    (5105, "RECEIVER_HAS_NO_PRIVILEGE"),
    (5203, "TARGET_NOT_SUBSCRIBABLE"),
    (5207, "NOT_ACCEPTABLE"),
];

lazy_static! {
    static ref LONG_TO_SHORT: HashMap<&'static str, &'static str> = NAMES.iter().copied().collect();
    static ref SHORT_TO_LONG: HashMap<&'static str, &'static str> =
        NAMES.iter().map(|(long, short)| (*short, *long)).collect();
    static ref JSON_KEY: Regex = Regex::new(r#"^(\s*)"([^"]+)"\s*:"#).unwrap();
    static ref TYPE_NAME: Regex = Regex::new(r"m2m:[a-zA-Z]+").unwrap();
}

/// Translate a long attribute name to its short name. Unknown names are
/// returned unchanged.
pub fn long_to_short(name: &str) -> &str {
    LONG_TO_SHORT.get(name).copied().unwrap_or(name)
}

pub fn short_to_long(name: &str) -> Option<&'static str> {
    SHORT_TO_LONG.get(name).copied()
}

/// Recursively rename all known long-name keys of a JSON document.
pub fn json_long_to_short(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut renamed = Map::with_capacity(map.len());
            for (key, inner) in map {
                renamed.insert(long_to_short(key).to_string(), json_long_to_short(inner));
            }
            Value::Object(renamed)
        }
        Value::Array(items) => Value::Array(items.iter().map(json_long_to_short).collect()),
        other => other.clone(),
    }
}

/// The oneM2M request/response parameter carried by an HTTP header
pub fn header_parameter(header: &str) -> Option<&'static str> {
    HEADER_PARAMETERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(header))
        .map(|(_, parameter)| *parameter)
}

pub fn status_code_name(rsc: i64) -> Option<&'static str> {
    STATUS_CODES
        .iter()
        .find(|(code, _)| *code == rsc)
        .map(|(_, name)| *name)
}

/// Annotate a response status code header value, e.g. `2001 (CREATED)`
pub fn annotate_rsc(value: &str) -> String {
    match value.trim().parse::<i64>().ok().and_then(status_code_name) {
        Some(name) => format!("{} ({})", value.trim(), name),
        None => value.to_string(),
    }
}

/// Append the long name as a trailing comment to every line of pretty
/// printed JSON whose key is a known short name.
pub fn annotate_short_names(json: &str, long_names: bool) -> String {
    if !long_names {
        return json.to_string();
    }
    json.lines()
        .map(|line| {
            let long = JSON_KEY.captures(line).and_then(|caps| {
                let key = caps.get(2)?.as_str();
                match short_to_long(key) {
                    Some(long) => Some(long),
                    None => key
                        .strip_prefix("m2m:")
                        .and_then(type_long_name),
                }
            });
            match long {
                Some(long) => format!("{}  // {}", line, long),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Annotate the `m2m:` type names appearing in a resource tree dump.
pub fn annotate_resource_tree(tree: &str, long_names: bool) -> String {
    if !long_names {
        return tree.to_string();
    }
    TYPE_NAME
        .replace_all(tree, |caps: &Captures| {
            let name = &caps[0];
            match type_long_name(&name[4..]) {
                Some(long) => format!("{} ({})", name, long),
                None => name.to_string(),
            }
        })
        .into_owned()
}

/// 1-based number of the line carrying the `m2m:dbg` debug message, if any.
pub fn highlight_debug_line(json: &str) -> Option<usize> {
    json.lines()
        .position(|line| line.contains("\"m2m:dbg\""))
        .map(|index| index + 1)
}

fn type_long_name(short: &str) -> Option<&'static str> {
    use strum::IntoEnumIterator;

    ResourceType::iter()
        .find(|ty| &ty.short_name()[4..] == short)
        .map(|ty| match ty {
            ResourceType::Acp => "accessControlPolicy",
            ResourceType::Ae => "AE",
            ResourceType::Container => "container",
            ResourceType::ContentInstance => "contentInstance",
            ResourceType::CseBase => "CSEBase",
            ResourceType::Group => "group",
            ResourceType::MgmtObj => "mgmtObj",
            ResourceType::Node => "node",
            ResourceType::Subscription => "subscription",
            ResourceType::FlexContainer => "flexContainer",
            ResourceType::DeviceInfo => "deviceInfo",
        })
}
