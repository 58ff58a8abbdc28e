// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Server path layouts. Resolvers map logical identifiers to server paths
//! without touching the network; the authoritative home locations still
//! come from discovery.

use std::fmt;

/// Maps logical identifiers to server paths for one server layout.
///
/// Implementations are pure. Returned paths are absolute and collection
/// paths end with a slash.
pub trait PathResolver: fmt::Debug + Send + Sync {
    /// Path of a principal resource, e.g. `/principals/users/alice/`.
    fn principal_path(&self, principal: &str) -> String;

    /// Path of a collection with the given identifier inside a home
    /// collection.
    fn collection_path(&self, home: &str, id: &str) -> String {
        let home = home.trim_end_matches('/');
        format!("{home}/{id}/")
    }
}

/// Layout used by most standards-following servers, with principals under
/// `/principals/users/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericResolver;

impl PathResolver for GenericResolver {
    fn principal_path(&self, principal: &str) -> String {
        format!("/principals/users/{principal}/")
    }
}

/// Radicale layout: the principal lives directly under the server root.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadicaleResolver;

impl PathResolver for RadicaleResolver {
    fn principal_path(&self, principal: &str) -> String {
        format!("/{principal}/")
    }
}

/// Baikal layout, with everything routed through `/dav.php`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaikalResolver;

impl PathResolver for BaikalResolver {
    fn principal_path(&self, principal: &str) -> String {
        format!("/dav.php/principals/{principal}/")
    }
}
