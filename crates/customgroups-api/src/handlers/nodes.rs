// ============================================================================
// Custom Groups API - Node Handlers
// File: crates/customgroups-api/src/handlers/nodes.rs
// ============================================================================
//! Handlers for every tree path. The decoded request path is resolved
//! against the resource tree and the method picks the node operation.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use customgroups_core::tree::flatten_existence;
use customgroups_core::{Node, ResourceNode};

use crate::dto::{
    AddMemberRequest, CreateGroupRequest, GroupChange, GroupDto, MemberDto, NodeView, SearchQuery,
    UpdateGroupRequest,
};
use crate::error::ApiError;
use crate::identity::CurrentPrincipal;
use crate::path::NodePath;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Read a node - GET /{path}
///
/// Group collections honour `pattern`, `limit` and `offset`.
pub async fn get_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<NodeView>>, ApiError> {
    let node = state.tree(principal).resolve_segments(path.segments()).await?;

    let view = match node {
        Node::Groups(collection) => {
            let groups = collection.search(&query.into()).await?;
            NodeView::Groups {
                name: collection.name(),
                groups: groups.iter().map(|g| GroupDto::from(g.group())).collect(),
            }
        }
        Node::Group(group) => NodeView::Group(GroupDto::from(group.group())),
        Node::Members(members) => {
            let list = members.list().await?;
            NodeView::Members {
                group: members.group().uri.clone(),
                members: list.iter().map(MemberDto::from).collect(),
            }
        }
        Node::Member(member) => NodeView::Member(MemberDto::from(member.membership())),
        other => {
            let children = other.resource().children().await?;
            NodeView::Collection {
                name: other.name(),
                children: children.iter().map(Node::name).collect(),
            }
        }
    };

    Ok(Json(ApiResponse::success(view)))
}

/// Existence check - HEAD /{path}
///
/// Answers 404 both for missing nodes and for nodes the caller may not see.
pub async fn head_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
) -> Result<StatusCode, ApiError> {
    let resolution = state.tree(principal).resolve_segments(path.segments()).await;
    let exists = flatten_existence(resolution)?;
    debug!("Checked {}: {}", path, exists);

    Ok(if exists { StatusCode::OK } else { StatusCode::NOT_FOUND })
}

/// Create a group - POST /users, POST /groups
///
/// Any other collection answers 405 from its `create_collection`.
pub async fn create_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GroupDto>>), ApiError> {
    let node = state.tree(principal).resolve_segments(path.segments()).await?;
    let created = node
        .resource()
        .create_collection(&payload.uri, payload.display_name.as_deref())
        .await?;

    match created {
        Node::Group(group) => {
            let dto = GroupDto::from(group.group());
            Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
        }
        other => Err(ApiError::InternalError(format!("Unexpected {} node created", other.kind()))),
    }
}

/// Rename a group or change its display name - PATCH .../{groupUri}
///
/// Exactly one of `uri` and `display_name` per request, so each update is a
/// single store call that either applies or fails as a whole.
pub async fn update_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<StatusCode, ApiError> {
    let change = payload.into_change()?;

    let node = state.tree(principal).resolve_segments(path.segments()).await?;
    let group = match node {
        Node::Group(group) => group,
        other => return Err(ApiError::MethodNotAllowed(format!("Cannot update {}", other.name()))),
    };

    match change {
        GroupChange::Uri(new_uri) => group.set_name(&new_uri).await?,
        GroupChange::DisplayName(display_name) => group.set_display_name(&display_name).await?,
    }

    info!("Group {} updated", group.group().uri);
    Ok(StatusCode::NO_CONTENT)
}

/// Add a member - PUT .../members/{userId}
///
/// The body is optional; without one the member is added as a non-admin.
pub async fn put_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
    payload: Option<Json<AddMemberRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<MemberDto>>), ApiError> {
    let (parent, user_id) = path
        .split_leaf()
        .ok_or_else(|| ApiError::BadRequest("Missing member id".into()))?;
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    let node = state.tree(principal).resolve_segments(parent).await?;
    let members = match node {
        Node::Members(members) => members,
        other => {
            return Err(ApiError::MethodNotAllowed(format!(
                "Cannot add members to {}",
                other.name()
            )))
        }
    };

    members.add_member(user_id, request.is_admin).await?;

    let member = MemberDto {
        user_id: user_id.to_string(),
        is_admin: request.is_admin,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

/// Delete a node - DELETE /{path}
pub async fn delete_node(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    path: NodePath,
) -> Result<StatusCode, ApiError> {
    let node = state.tree(principal).resolve_segments(path.segments()).await?;
    node.resource().delete().await?;

    Ok(StatusCode::NO_CONTENT)
}
