use std::collections::BTreeMap;

use thiserror::Error;

use crate::acl::AccessLevel;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("sample id cannot be empty")]
    EmptySampleId,

    #[error("invalid object reference '{value}': expected workspace/object/version")]
    InvalidObjectRef { value: String },

    #[error("unknown access level '{0}' (expected reader, writer or admin)")]
    UnknownAccessLevel(String),

    #[error("sample '{name}' not found in sample set '{set}'")]
    SampleNotFound { name: String, set: String },

    #[error("users requested at more than one access level: {}", describe_overlaps(.users))]
    OverlappingGrants {
        users: BTreeMap<String, Vec<AccessLevel>>,
    },
}

fn describe_overlaps(users: &BTreeMap<String, Vec<AccessLevel>>) -> String {
    users
        .iter()
        .map(|(user, levels)| {
            let levels: Vec<&str> = levels.iter().map(AccessLevel::as_str).collect();
            format!("{user} ({})", levels.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ModelError>;
