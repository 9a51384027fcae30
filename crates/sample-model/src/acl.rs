//! Access levels and ACL requests.
//!
//! An [`AclRequest`] lists users per [`AccessLevel`]. Before it is sent to the
//! permission service it is resolved into exactly one level per user; the
//! [`OverlapPolicy`] decides what happens when a user was listed at several
//! levels.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Permission level on a sample. `Admin` implies `Writer` implies `Reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Reader,
    Writer,
    Admin,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Reader, AccessLevel::Writer, AccessLevel::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Reader => "reader",
            AccessLevel::Writer => "writer",
            AccessLevel::Admin => "admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reader" | "read" | "r" => Ok(AccessLevel::Reader),
            "writer" | "write" | "w" => Ok(AccessLevel::Writer),
            "admin" | "a" => Ok(AccessLevel::Admin),
            _ => Err(ModelError::UnknownAccessLevel(s.to_string())),
        }
    }
}

/// How to treat a user listed at more than one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Keep the highest requested level.
    #[default]
    HighestWins,
    /// Refuse the whole request.
    Reject,
}

/// Requested grants, grouped by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRequest {
    grants: BTreeMap<AccessLevel, BTreeSet<String>>,
}

impl AclRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user` at `level`. Blank user ids are ignored.
    pub fn grant(mut self, level: AccessLevel, user: impl Into<String>) -> Self {
        self.insert(level, user);
        self
    }

    pub fn insert(&mut self, level: AccessLevel, user: impl Into<String>) {
        let user = user.into();
        let user = user.trim();
        if user.is_empty() {
            return;
        }
        self.grants
            .entry(level)
            .or_default()
            .insert(user.to_string());
    }

    /// Builds a request from a user list plus reader/writer/admin flags.
    ///
    /// The highest set flag determines the level for every user. Returns
    /// `None` when no flag is set.
    pub fn from_flags<I, S>(users: I, is_reader: bool, is_writer: bool, is_admin: bool) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let level = [
            (is_admin, AccessLevel::Admin),
            (is_writer, AccessLevel::Writer),
            (is_reader, AccessLevel::Reader),
        ]
        .into_iter()
        .find_map(|(set, level)| set.then_some(level))?;
        let mut request = Self::new();
        for user in users {
            request.insert(level, user);
        }
        Some(request)
    }

    pub fn users_at(&self, level: AccessLevel) -> impl Iterator<Item = &str> {
        self.grants
            .get(&level)
            .into_iter()
            .flat_map(|users| users.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.grants.values().all(BTreeSet::is_empty)
    }

    /// Resolves the request into one level per user.
    pub fn resolve(&self, policy: OverlapPolicy) -> Result<ResolvedAcl, ModelError> {
        let mut seen: BTreeMap<String, Vec<AccessLevel>> = BTreeMap::new();
        for (level, users) in &self.grants {
            for user in users {
                seen.entry(user.clone()).or_default().push(*level);
            }
        }

        let overlaps: BTreeMap<String, Vec<AccessLevel>> = seen
            .iter()
            .filter(|(_, levels)| levels.len() > 1)
            .map(|(user, levels)| (user.clone(), levels.clone()))
            .collect();
        if policy == OverlapPolicy::Reject && !overlaps.is_empty() {
            return Err(ModelError::OverlappingGrants { users: overlaps });
        }

        let levels = seen
            .into_iter()
            .filter_map(|(user, levels)| levels.into_iter().max().map(|level| (user, level)))
            .collect();
        Ok(ResolvedAcl { levels })
    }
}

/// A request after overlap resolution: exactly one level per user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAcl {
    levels: BTreeMap<String, AccessLevel>,
}

impl ResolvedAcl {
    pub fn level_of(&self, user: &str) -> Option<AccessLevel> {
        self.levels.get(user).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AccessLevel)> {
        self.levels.iter().map(|(user, level)| (user.as_str(), *level))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Payload shape expected by the permission service.
    pub fn payload(&self) -> AclPayload {
        let mut payload = AclPayload::default();
        for (user, level) in &self.levels {
            let bucket = match level {
                AccessLevel::Admin => &mut payload.admin,
                AccessLevel::Writer => &mut payload.writer,
                AccessLevel::Reader => &mut payload.reader,
            };
            bucket.push(user.clone());
        }
        payload
    }
}

/// Wire payload for one sample's ACL update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPayload {
    pub admin: Vec<String>,
    pub writer: Vec<String>,
    pub reader: Vec<String>,
}

impl AclPayload {
    pub fn entries(&self) -> impl Iterator<Item = (&str, AccessLevel)> {
        let admin = self.admin.iter().map(|u| (u.as_str(), AccessLevel::Admin));
        let writer = self.writer.iter().map(|u| (u.as_str(), AccessLevel::Writer));
        let reader = self.reader.iter().map(|u| (u.as_str(), AccessLevel::Reader));
        admin.chain(writer).chain(reader)
    }
}

/// Workspace entry that stands for every user.
pub const GLOBAL_USER: &str = "*";

/// Who can access a workspace, as carried over onto newly imported samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceAcl {
    pub admin: BTreeSet<String>,
    pub write: BTreeSet<String>,
    pub read: BTreeSet<String>,
    pub public_read: bool,
}

impl WorkspaceAcl {
    /// Builds from raw workspace permissions (`user -> a|w|r|n`).
    ///
    /// `owner` is skipped since it already owns the new samples. The
    /// [`GLOBAL_USER`] entry only sets `public_read`.
    pub fn from_permissions<'a, I>(owner: &str, permissions: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut acl = Self::default();
        for (user, code) in permissions {
            if code.trim().eq_ignore_ascii_case("n") {
                continue;
            }
            let level: AccessLevel = code.parse()?;
            if user == GLOBAL_USER {
                acl.public_read = true;
                continue;
            }
            if user == owner {
                continue;
            }
            let bucket = match level {
                AccessLevel::Admin => &mut acl.admin,
                AccessLevel::Writer => &mut acl.write,
                AccessLevel::Reader => &mut acl.read,
            };
            bucket.insert(user.to_string());
        }
        Ok(acl)
    }

    /// Named users at their workspace level. `public_read` has no per-user form.
    pub fn to_request(&self) -> AclRequest {
        let mut request = AclRequest::new();
        for (level, users) in [
            (AccessLevel::Admin, &self.admin),
            (AccessLevel::Writer, &self.write),
            (AccessLevel::Reader, &self.read),
        ] {
            for user in users {
                request.insert(level, user.as_str());
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AccessLevel::Admin > AccessLevel::Writer);
        assert!(AccessLevel::Writer > AccessLevel::Reader);
    }

    #[test]
    fn parse_access_level() {
        assert_eq!("Admin".parse::<AccessLevel>().unwrap(), AccessLevel::Admin);
        assert_eq!(" write ".parse::<AccessLevel>().unwrap(), AccessLevel::Writer);
        assert!("owner".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn overlapping_user_highest_wins() {
        let request = AclRequest::new()
            .grant(AccessLevel::Writer, "alice")
            .grant(AccessLevel::Admin, "alice");
        let resolved = request.resolve(OverlapPolicy::HighestWins).unwrap();
        assert_eq!(resolved.level_of("alice"), Some(AccessLevel::Admin));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.payload().admin, vec!["alice".to_string()]);
        assert!(resolved.payload().writer.is_empty());
    }

    #[test]
    fn overlapping_user_rejected() {
        let request = AclRequest::new()
            .grant(AccessLevel::Writer, "alice")
            .grant(AccessLevel::Admin, "alice")
            .grant(AccessLevel::Reader, "bob");
        let err = request.resolve(OverlapPolicy::Reject).unwrap_err();
        let ModelError::OverlappingGrants { users } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            users.get("alice"),
            Some(&vec![AccessLevel::Writer, AccessLevel::Admin])
        );
        assert!(!users.contains_key("bob"));
        assert!(err.to_string().contains("alice (writer, admin)"));
    }

    #[test]
    fn flags_pick_highest_level() {
        let request = AclRequest::from_flags(["u1", "u2"], true, true, false).unwrap();
        let resolved = request.resolve(OverlapPolicy::Reject).unwrap();
        assert_eq!(resolved.level_of("u1"), Some(AccessLevel::Writer));
        assert_eq!(resolved.level_of("u2"), Some(AccessLevel::Writer));

        assert!(AclRequest::from_flags(["u1"], false, false, false).is_none());
    }

    #[test]
    fn blank_users_are_ignored() {
        let request = AclRequest::new().grant(AccessLevel::Reader, "  ");
        assert!(request.is_empty());
    }

    #[test]
    fn workspace_acl_from_permissions() {
        let acl = WorkspaceAcl::from_permissions(
            "owner",
            [
                ("owner", "a"),
                ("jrbolton", "w"),
                ("alice", "r"),
                ("bob", "a"),
                ("carol", "n"),
                ("*", "r"),
            ],
        )
        .unwrap();
        assert!(acl.write.contains("jrbolton"));
        assert!(acl.read.contains("alice"));
        assert!(acl.admin.contains("bob"));
        assert!(!acl.admin.contains("owner"));
        assert!(acl.public_read);
        assert_eq!(acl.read.len() + acl.write.len() + acl.admin.len(), 3);

        let resolved = acl.to_request().resolve(OverlapPolicy::Reject).unwrap();
        assert_eq!(resolved.level_of("jrbolton"), Some(AccessLevel::Writer));
        assert_eq!(resolved.level_of("carol"), None);
        assert_eq!(resolved.level_of("*"), None);
    }

    #[test]
    fn workspace_acl_private_and_invalid() {
        let acl = WorkspaceAcl::from_permissions("owner", [("owner", "a"), ("*", "n")]).unwrap();
        assert!(!acl.public_read);
        assert!(acl.to_request().is_empty());

        assert!(matches!(
            WorkspaceAcl::from_permissions("owner", [("alice", "x")]),
            Err(ModelError::UnknownAccessLevel(_))
        ));
    }

    fn level_strategy() -> impl Strategy<Value = AccessLevel> {
        prop_oneof![
            Just(AccessLevel::Reader),
            Just(AccessLevel::Writer),
            Just(AccessLevel::Admin),
        ]
    }

    proptest! {
        #[test]
        fn highest_wins_keeps_max_level(
            grants in proptest::collection::vec(("[a-d]", level_strategy()), 1..20)
        ) {
            let mut request = AclRequest::new();
            for (user, level) in &grants {
                request.insert(*level, user.clone());
            }
            let resolved = request.resolve(OverlapPolicy::HighestWins).unwrap();
            for (user, _) in &grants {
                let expected = grants
                    .iter()
                    .filter(|(u, _)| u == user)
                    .map(|(_, level)| *level)
                    .max();
                prop_assert_eq!(resolved.level_of(user), expected);
            }
            let payload = resolved.payload();
            prop_assert_eq!(payload.entries().count(), resolved.len());
        }
    }
}
