//! HATEOAS link rendering
//!
//! Serialized resources carry a `_links` object. `self` is always present;
//! `update` and `delete` are rendered only when the caller holds the admin
//! role. For everyone else the keys are absent entirely, not null.

use serde::Serialize;

/// A hypermedia reference to a related action or resource
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub href: String,
}

/// `_links` object attached to serialized resources
#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Link>,
}

impl Links {
    /// Links for a resource exposing no admin-only actions
    pub fn read_only(href: String) -> Self {
        Self {
            self_link: Link { href },
            update: None,
            delete: None,
        }
    }

    /// Links including update/delete when the caller is admin
    pub fn with_admin_actions(href: String, is_admin: bool) -> Self {
        let (update, delete) = if is_admin {
            (
                Some(Link { href: href.clone() }),
                Some(Link { href: href.clone() }),
            )
        } else {
            (None, None)
        };

        Self {
            self_link: Link { href },
            update,
            delete,
        }
    }
}
