//! Collection diff classification
//!
//! Turns one collection [`FieldDiff`](crate::model::FieldDiff) into the
//! [`FieldChange`]s the feed reports. Each side (added, removed) is
//! classified on its own by the [`Element`] variant it holds.
//!
//! Relationship elements are special: they are only reported on
//! `linkedWorkItems`, only for requested roles, and every accepted link
//! becomes its own change so that the opposite end can be synthesized later
//! through the [`BacklinkRegistry`].

use crate::backlinks::BacklinkRegistry;
use crate::errors::FeedError;
use crate::model::{Element, FieldChange, LinkDirection, LinkRole, Revision, LINKED_ITEMS_FIELD};
use crate::stringify::element_token;
use std::collections::BTreeSet;

/// Link role ids a request asked for
///
/// An empty filter excludes links entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFilter {
    allowed: BTreeSet<String>,
}

impl RoleFilter {
    pub fn new<I, S>(role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: role_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that admits no role
    pub fn none() -> Self {
        Self::default()
    }

    pub fn allows(&self, role_id: &str) -> bool {
        self.allowed.contains(role_id)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

/// Where a classified change is observed
pub struct ClassifyContext<'a> {
    pub item_id: &'a str,
    pub revision: Revision,
    pub roles: &'a RoleFilter,
    pub backlinks: &'a mut BacklinkRegistry,
}

enum Side {
    Empty,
    Tokens(Vec<String>),
    Links(Vec<(String, LinkRole)>),
    /// Relationships outside `linkedWorkItems`, or with no role requested
    Skipped,
}

/// Classify one collection diff into reportable changes
///
/// A side that cannot be classified is reported as an empty list and a
/// warning is logged; the request carries on.
pub fn classify_collection(
    field: &str,
    added: &[Element],
    removed: &[Element],
    ctx: &mut ClassifyContext<'_>,
) -> Vec<FieldChange> {
    let added_side = classify_side(field, added, ctx);
    let removed_side = classify_side(field, removed, ctx);

    let mut changes = Vec::new();
    let mut added_tokens = None;
    let mut removed_tokens = None;

    for (side, is_added) in [(added_side, true), (removed_side, false)] {
        match side {
            Side::Links(links) => {
                for (target_id, role) in links {
                    ctx.backlinks
                        .register(ctx.item_id, ctx.revision, &target_id, &role, is_added);
                    changes.push(relationship_change(field, target_id, &role, is_added));
                }
            }
            Side::Tokens(tokens) => {
                if is_added {
                    added_tokens = Some(tokens);
                } else {
                    removed_tokens = Some(tokens);
                }
            }
            Side::Empty | Side::Skipped => {}
        }
    }

    if added_tokens.is_some() || removed_tokens.is_some() {
        changes.insert(
            0,
            FieldChange::Collection {
                field_name: field.to_string(),
                added: added_tokens.unwrap_or_default(),
                removed: removed_tokens.unwrap_or_default(),
            },
        );
    }
    changes
}

fn relationship_change(field: &str, target_id: String, role: &LinkRole, added: bool) -> FieldChange {
    let (added, removed) = if added {
        (vec![target_id], Vec::new())
    } else {
        (Vec::new(), vec![target_id])
    };
    FieldChange::Relationship {
        field_name: field.to_string(),
        link_role_id: role.id.clone(),
        link_role_name: role.name.clone(),
        link_direction: LinkDirection::Outgoing,
        added,
        removed,
    }
}

fn classify_side(field: &str, elements: &[Element], ctx: &ClassifyContext<'_>) -> Side {
    let Some(first) = elements.first() else {
        return Side::Empty;
    };

    match cast_side(field, first, elements, ctx.roles) {
        Ok(side) => side,
        Err(err) => {
            tracing::warn!(
                item_id = ctx.item_id,
                revision = %ctx.revision,
                field,
                error = %err,
                "collection side could not be classified, reporting it empty"
            );
            Side::Tokens(Vec::new())
        }
    }
}

fn cast_side(
    field: &str,
    first: &Element,
    elements: &[Element],
    roles: &RoleFilter,
) -> Result<Side, FeedError> {
    let shape = first.shape();
    if let Some(other) = elements.iter().find(|e| e.shape() != shape) {
        return Err(FeedError::CollectionElementCastMismatch {
            field: field.to_string(),
            reason: format!("mixed elements: {} and {}", shape, other.shape()),
        });
    }

    match first {
        Element::Relationship { .. } => {
            if field != LINKED_ITEMS_FIELD || roles.is_empty() {
                return Ok(Side::Skipped);
            }
            let links = elements
                .iter()
                .filter_map(|element| match element {
                    Element::Relationship { target_id, role } if roles.allows(&role.id) => {
                        Some((target_id.clone(), role.clone()))
                    }
                    _ => None,
                })
                .collect();
            Ok(Side::Links(links))
        }
        Element::Opaque { .. } => Err(FeedError::CollectionElementCastMismatch {
            field: field.to_string(),
            reason: "untyped collection element".to_string(),
        }),
        _ => elements
            .iter()
            .map(|element| {
                element_token(element).ok_or_else(|| FeedError::CollectionElementCastMismatch {
                    field: field.to_string(),
                    reason: format!("{} element without an id", element.shape()),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Side::Tokens),
    }
}
