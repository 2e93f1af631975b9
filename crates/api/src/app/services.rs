//! Store wiring and the orchestration layer.
//!
//! `AppServices` owns every store and collaborator. Handlers call its
//! methods with already-extracted inputs; each method takes the clock
//! once (`Utc::now()`) and threads it into the domain functions, returns
//! `DomainResult`, and publishes notification drafts as best-effort side
//! work after its own writes have committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::warn;

use taskhive_auth::{
    ProjectPermission, ProjectRole, TokenConfig, TokenPurpose, TokenService, UserAccount,
    WorkspaceRole, effective_project_permission, hash_password, verify_password,
};
use taskhive_core::{
    DomainError, DomainResult, NotificationId, ProjectId, UserId, WorkspaceId,
};
use taskhive_events::{EventBus, InMemoryEventBus};
use taskhive_infra::{
    CollabStore, EmailSender, LogMailer, NotificationPage, NotificationStore, NotificationWorker,
    TokenRecord, TokenVault, UserDirectory,
};
use taskhive_notifications::{
    Notification, NotificationDraft, NotificationType, ResourceRef, ResourceType,
};
use taskhive_workspaces::{Project, ProjectMember, Workspace, graph};

use crate::config::ApiConfig;

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// A successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserAccount,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AppServices {
    users: UserDirectory,
    collab: CollabStore,
    vault: TokenVault,
    notifications: Arc<NotificationStore>,
    outbound: Arc<InMemoryEventBus<NotificationDraft>>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn EmailSender>,
    frontend_base_url: String,
    // Keeps the delivery thread alive for the lifetime of the app.
    _worker: NotificationWorker,
}

/// Wire up stores, bus, worker, and collaborators.
pub fn build_services(config: &ApiConfig) -> AppServices {
    build_services_with_mailer(config, Arc::new(LogMailer))
}

/// Same wiring with an injected mail transport, for tests.
pub fn build_services_with_mailer(
    config: &ApiConfig,
    mailer: Arc<dyn EmailSender>,
) -> AppServices {
    let outbound = Arc::new(InMemoryEventBus::new());
    let notifications = Arc::new(NotificationStore::new());
    let worker = NotificationWorker::spawn(outbound.subscribe(), Arc::clone(&notifications));

    AppServices {
        users: UserDirectory::new(),
        collab: CollabStore::new(),
        vault: TokenVault::new(),
        notifications,
        outbound,
        tokens: Arc::new(TokenService::new(TokenConfig::new(
            config.token_secret.clone(),
        ))),
        mailer,
        frontend_base_url: config.frontend_base_url.trim_end_matches('/').to_string(),
        _worker: worker,
    }
}

impl AppServices {
    pub fn tokens(&self) -> Arc<TokenService> {
        Arc::clone(&self.tokens)
    }

    fn notify(&self, draft: NotificationDraft) {
        if let Err(err) = self.outbound.publish(draft) {
            warn!(?err, "failed to publish notification draft");
        }
    }

    fn send_email(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        if self.mailer.send(to, subject, body) {
            Ok(())
        } else {
            Err(DomainError::dependency("failed to send email"))
        }
    }

    /// Issue a single-use token, persist its record, and return it.
    ///
    /// The vault enforces one live token per (user, purpose, workspace);
    /// callers surface the resulting `Conflict` directly.
    fn issue_single_use(
        &self,
        user: UserId,
        purpose: TokenPurpose,
        workspace: Option<(WorkspaceId, WorkspaceRole)>,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        let (token, expires_at) = match workspace {
            Some((ws, role)) => self
                .tokens
                .issue_invite(user, ws, role, now)
                .map_err(|_| DomainError::dependency("failed to sign token"))?,
            None => self
                .tokens
                .issue(user, purpose, now)
                .map_err(|_| DomainError::dependency("failed to sign token"))?,
        };
        self.vault.reserve(
            user,
            TokenRecord {
                token: token.clone(),
                purpose,
                workspace: workspace.map(|(ws, _)| ws),
                expires_at,
            },
            now,
        )?;
        Ok(token)
    }

    /// Consumption protocol shared by the three single-use purposes:
    /// verify the signature, atomically take the vault record, and check
    /// its expiry against the wall clock.
    fn consume_single_use(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> DomainResult<(taskhive_auth::TokenClaims, TokenRecord)> {
        let claims = self
            .tokens
            .verify(token, purpose)
            .map_err(|_| DomainError::unauthorized("Invalid or expired token"))?;
        let record = self
            .vault
            .consume(claims.sub, token, now)
            .map_err(|err| match err {
                DomainError::NotFound(_) => {
                    DomainError::unauthorized("Invalid or expired token")
                }
                other => other,
            })?;
        Ok((claims, record))
    }

    // ---- auth flow ----

    pub fn register(&self, email: &str, name: &str, password: &str) -> DomainResult<UserAccount> {
        let now = Utc::now();
        if password.len() < 8 {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }
        let hash = hash_password(password)?;
        let account = UserAccount::register(email, name, hash, now)?;
        self.users.insert(account.clone())?;

        let token =
            self.issue_single_use(account.id, TokenPurpose::EmailVerification, None, now)?;
        if let Err(err) = self.send_verification_email(&account, &token) {
            // Leave the account, drop the reservation; a later login
            // attempt re-triggers issuance.
            let _ = self.vault.revoke(account.id, TokenPurpose::EmailVerification);
            return Err(err);
        }
        Ok(account)
    }

    fn send_verification_email(&self, account: &UserAccount, token: &str) -> DomainResult<()> {
        let link = format!("{}/verify-email?token={token}", self.frontend_base_url);
        let body = format!(
            "<p>Hi {},</p><p>Click <a href=\"{link}\">here</a> to verify your email.</p>",
            account.name
        );
        self.send_email(&account.email, "Verify your email", &body)
    }

    pub fn verify_email(&self, token: &str) -> DomainResult<UserAccount> {
        let now = Utc::now();
        let (claims, _record) =
            self.consume_single_use(token, TokenPurpose::EmailVerification, now)?;
        self.users.update(claims.sub, |account| account.verify_email())
    }

    pub fn login(&self, email: &str, password: &str) -> DomainResult<Session> {
        let now = Utc::now();
        let account = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| DomainError::unauthorized(BAD_CREDENTIALS))?;
        if !verify_password(password, &account.password_hash) {
            return Err(DomainError::unauthorized(BAD_CREDENTIALS));
        }

        if !account.is_email_verified {
            // No session for an unverified account; re-trigger the
            // verification flow instead.
            return match self.issue_single_use(
                account.id,
                TokenPurpose::EmailVerification,
                None,
                now,
            ) {
                Ok(token) => {
                    if let Err(err) = self.send_verification_email(&account, &token) {
                        let _ = self
                            .vault
                            .revoke(account.id, TokenPurpose::EmailVerification);
                        return Err(err);
                    }
                    Err(DomainError::conflict(
                        "Email not verified; a new verification link has been sent",
                    ))
                }
                Err(DomainError::Conflict(_)) => Err(DomainError::conflict(
                    "Email not verified; check your inbox for the verification link",
                )),
                Err(other) => Err(other),
            };
        }

        let (token, expires_at) = self
            .tokens
            .issue(account.id, TokenPurpose::Login, now)
            .map_err(|_| DomainError::dependency("failed to sign token"))?;
        let user = self.users.update(account.id, |a| {
            a.record_login(now);
            Ok(())
        })?;
        Ok(Session { user, token, expires_at })
    }

    pub fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        let now = Utc::now();
        let account = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| DomainError::not_found("User"))?;
        if !account.is_email_verified {
            return Err(DomainError::conflict("Please verify your email first"));
        }

        let token = self.issue_single_use(account.id, TokenPurpose::ResetPassword, None, now)?;
        let link = format!("{}/reset-password?token={token}", self.frontend_base_url);
        let body = format!(
            "<p>Hi {},</p><p>Click <a href=\"{link}\">here</a> to reset your password. \
             The link expires in 15 minutes.</p>",
            account.name
        );
        if let Err(err) = self.send_email(&account.email, "Reset your password", &body) {
            let _ = self.vault.revoke(account.id, TokenPurpose::ResetPassword);
            return Err(err);
        }
        Ok(())
    }

    pub fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> DomainResult<()> {
        let now = Utc::now();
        if new_password != confirm_password {
            return Err(DomainError::validation("Passwords do not match"));
        }
        if new_password.len() < 8 {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }

        let (claims, _record) =
            self.consume_single_use(token, TokenPurpose::ResetPassword, now)?;
        let hash = hash_password(new_password)?;
        self.users.update(claims.sub, |account| {
            account.set_password_hash(hash);
            Ok(())
        })?;
        Ok(())
    }

    pub fn user(&self, id: UserId) -> DomainResult<UserAccount> {
        self.users.get(id)
    }

    // ---- workspaces ----

    pub fn create_workspace(
        &self,
        actor: UserId,
        name: &str,
        description: Option<String>,
        color: Option<String>,
    ) -> DomainResult<Workspace> {
        let workspace = Workspace::create(name, description, color, actor, Utc::now())?;
        self.collab.insert_workspace(workspace.clone())?;
        Ok(workspace)
    }

    pub fn list_workspaces(&self, actor: UserId) -> DomainResult<Vec<Workspace>> {
        self.collab.workspaces_for(actor)
    }

    pub fn get_workspace(&self, actor: UserId, id: WorkspaceId) -> DomainResult<Workspace> {
        let workspace = self.collab.workspace(id)?;
        if !workspace.is_member(actor) {
            return Err(DomainError::forbidden(
                "You are not a member of this workspace",
            ));
        }
        Ok(workspace)
    }

    pub fn update_workspace(
        &self,
        actor: UserId,
        id: WorkspaceId,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
    ) -> DomainResult<Workspace> {
        let actor_name = self.users.get(actor)?.name;
        let workspace = self.collab.update_workspace(id, |workspace| {
            if workspace.owner != actor {
                return Err(DomainError::forbidden(
                    "Only the workspace owner can update the workspace",
                ));
            }
            workspace.update_details(name, description, color)
        })?;

        self.notify(NotificationDraft {
            recipients: workspace.members.iter().map(|m| m.user).collect(),
            kind: NotificationType::WorkspaceUpdated,
            title: "Workspace updated".to_string(),
            message: format!("{actor_name} updated the workspace \"{}\"", workspace.name),
            resource: Some(ResourceRef {
                kind: ResourceType::Workspace,
                id: *workspace.id.as_uuid(),
            }),
            actor: Some(actor),
            workspace: Some(workspace.id),
            metadata: Some(json!({
                "workspaceName": workspace.name,
                "actionByName": actor_name,
            })),
        });
        Ok(workspace)
    }

    pub fn delete_workspace(&self, actor: UserId, id: WorkspaceId) -> DomainResult<()> {
        let workspace = self.collab.workspace(id)?;
        if workspace.owner != actor {
            return Err(DomainError::forbidden(
                "Only the workspace owner can delete the workspace",
            ));
        }
        self.collab.delete_workspace(id)?;
        self.notifications.delete_for_workspace(id)?;
        // Outstanding invite tokens die at accept time: the workspace
        // lookup fails with NotFound.
        Ok(())
    }

    // ---- membership ----

    pub fn invite_member(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
        email: &str,
        role: Option<WorkspaceRole>,
    ) -> DomainResult<()> {
        let now = Utc::now();
        let workspace = self.collab.workspace(workspace_id)?;
        let actor_role = workspace
            .role_of(actor)
            .ok_or_else(|| DomainError::forbidden("You are not a member of this workspace"))?;
        if !actor_role.can_manage_members() {
            return Err(DomainError::forbidden(
                "You don't have permission to invite members",
            ));
        }
        let role = role.unwrap_or(WorkspaceRole::Member);
        if role == WorkspaceRole::Owner {
            return Err(DomainError::validation("cannot invite a user as owner"));
        }
        if role == WorkspaceRole::Admin && actor_role != WorkspaceRole::Owner {
            return Err(DomainError::forbidden(
                "Only the workspace owner can assign admin roles",
            ));
        }

        let invitee = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| DomainError::not_found("User"))?;
        if workspace.is_member(invitee.id) {
            return Err(DomainError::conflict(
                "User already a member of this workspace",
            ));
        }

        let token = self.issue_single_use(
            invitee.id,
            TokenPurpose::WorkspaceInvite,
            Some((workspace_id, role)),
            now,
        )?;
        let link = format!(
            "{}/workspace-invite/{}?tk={token}",
            self.frontend_base_url, workspace_id
        );
        let body = format!(
            "<p>Hi {},</p><p>You've been invited to join the workspace \
             \"{}\". Click <a href=\"{link}\">here</a> to accept.</p>",
            invitee.name, workspace.name
        );
        if let Err(err) =
            self.send_email(&invitee.email, "Workspace invitation", &body)
        {
            let _ = self.vault.revoke(invitee.id, TokenPurpose::WorkspaceInvite);
            return Err(err);
        }

        let actor_name = self.users.get(actor)?.name;
        self.notify(NotificationDraft {
            recipients: vec![invitee.id],
            kind: NotificationType::WorkspaceInvited,
            title: "Workspace invitation".to_string(),
            message: format!(
                "{actor_name} invited you to join the workspace \"{}\"",
                workspace.name
            ),
            resource: Some(ResourceRef {
                kind: ResourceType::Workspace,
                id: *workspace_id.as_uuid(),
            }),
            actor: Some(actor),
            workspace: Some(workspace_id),
            metadata: Some(json!({
                "workspaceName": workspace.name,
                "actionByName": actor_name,
                "role": role,
            })),
        });
        Ok(())
    }

    /// Redeem a workspace-invite token. The session user must be the
    /// invitee the token was issued to.
    pub fn accept_invite_token(&self, actor: UserId, token: &str) -> DomainResult<Workspace> {
        let now = Utc::now();
        let claims = self
            .tokens
            .verify(token, TokenPurpose::WorkspaceInvite)
            .map_err(|_| DomainError::unauthorized("Invalid or expired token"))?;
        if claims.sub != actor {
            // Same opaque message as every other token failure; a leaked
            // token must not reveal who it was issued to.
            return Err(DomainError::unauthorized("Invalid or expired token"));
        }
        let workspace_id = claims
            .workspace
            .ok_or_else(|| DomainError::unauthorized("Invalid or expired token"))?;
        let role = claims.role.unwrap_or(WorkspaceRole::Member);

        // Take the single-use record before joining; replay loses here.
        let _record = self.vault.consume(actor, token, now).map_err(|err| match err {
            DomainError::NotFound(_) => DomainError::unauthorized("Invalid or expired token"),
            other => other,
        })?;

        self.join_and_announce(actor, workspace_id, role, now)
    }

    /// Direct join as `member`, used by shareable workspace links.
    pub fn accept_invite_path(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
    ) -> DomainResult<Workspace> {
        self.join_and_announce(actor, workspace_id, WorkspaceRole::Member, Utc::now())
    }

    fn join_and_announce(
        &self,
        user: UserId,
        workspace_id: WorkspaceId,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> DomainResult<Workspace> {
        let (workspace, _outcome) = self.collab.join_workspace(workspace_id, user, role, now)?;

        let joiner_name = self.users.get(user)?.name;
        let resource = Some(ResourceRef {
            kind: ResourceType::Workspace,
            id: *workspace_id.as_uuid(),
        });
        // Joins are management noise for regular members; only the owner
        // and admins hear about them.
        self.notify(NotificationDraft {
            recipients: workspace.managers(),
            kind: NotificationType::WorkspaceMemberJoined,
            title: "New workspace member".to_string(),
            message: format!("{joiner_name} joined the workspace \"{}\"", workspace.name),
            resource,
            actor: Some(user),
            workspace: Some(workspace_id),
            metadata: Some(json!({
                "memberName": joiner_name,
                "workspaceName": workspace.name,
            })),
        });
        self.notify(NotificationDraft {
            recipients: vec![user],
            kind: NotificationType::WorkspaceInvited,
            title: "Welcome aboard".to_string(),
            message: format!("You joined the workspace \"{}\"", workspace.name),
            resource,
            actor: Some(workspace.owner),
            workspace: Some(workspace_id),
            metadata: Some(json!({ "workspaceName": workspace.name })),
        });
        Ok(workspace)
    }

    pub fn update_member_role(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
        target: UserId,
        new_role: WorkspaceRole,
    ) -> DomainResult<Workspace> {
        let mut old_role = None;
        let workspace = self.collab.update_workspace(workspace_id, |workspace| {
            let actor_role = workspace.role_of(actor).ok_or_else(|| {
                DomainError::forbidden("You are not a member of this workspace")
            })?;
            old_role = Some(workspace.change_member_role(actor_role, target, new_role)?);
            Ok(())
        })?;

        if let Some(old_role) = old_role {
            let actor_name = self.users.get(actor)?.name;
            self.notify(NotificationDraft {
                recipients: vec![target],
                kind: NotificationType::WorkspaceUpdated,
                title: "Workspace role changed".to_string(),
                message: format!(
                    "{actor_name} changed your role in \"{}\" from {old_role} to {new_role}",
                    workspace.name
                ),
                resource: Some(ResourceRef {
                    kind: ResourceType::Workspace,
                    id: *workspace_id.as_uuid(),
                }),
                actor: Some(actor),
                workspace: Some(workspace_id),
                metadata: Some(json!({
                    "workspaceName": workspace.name,
                    "actionByName": actor_name,
                    "oldRole": old_role,
                    "newRole": new_role,
                })),
            });
        }
        Ok(workspace)
    }

    pub fn remove_member(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
        target: UserId,
    ) -> DomainResult<Workspace> {
        {
            let workspace = self.collab.workspace(workspace_id)?;
            let actor_role = workspace.role_of(actor).ok_or_else(|| {
                DomainError::forbidden("You are not a member of this workspace")
            })?;
            if !actor_role.can_manage_members() && actor != target {
                return Err(DomainError::forbidden(
                    "You don't have permission to remove members",
                ));
            }
        }

        let removed_name = self.users.get(target)?.name;
        let (workspace, _projects) = self.collab.remove_member(workspace_id, target)?;

        let resource = Some(ResourceRef {
            kind: ResourceType::Workspace,
            id: *workspace_id.as_uuid(),
        });
        if actor == target {
            // Voluntary leave: tell the people who manage the roster.
            self.notify(NotificationDraft {
                recipients: workspace.managers(),
                kind: NotificationType::WorkspaceUpdated,
                title: "Member left".to_string(),
                message: format!("{removed_name} left the workspace \"{}\"", workspace.name),
                resource,
                actor: Some(target),
                workspace: Some(workspace_id),
                metadata: Some(json!({
                    "memberName": removed_name,
                    "workspaceName": workspace.name,
                })),
            });
        } else {
            let actor_name = self.users.get(actor)?.name;
            self.notify(NotificationDraft {
                recipients: vec![target],
                kind: NotificationType::WorkspaceUpdated,
                title: "Removed from workspace".to_string(),
                message: format!(
                    "You were removed from \"{}\" by {actor_name}",
                    workspace.name
                ),
                resource,
                actor: Some(actor),
                workspace: Some(workspace_id),
                metadata: Some(json!({
                    "workspaceName": workspace.name,
                    "actionByName": actor_name,
                })),
            });
        }
        Ok(workspace)
    }

    // ---- projects ----

    pub fn create_project(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
        title: &str,
        description: Option<String>,
        members: Vec<(UserId, ProjectRole)>,
    ) -> DomainResult<Project> {
        let now = Utc::now();
        let workspace = self.collab.workspace(workspace_id)?;
        if !workspace.is_member(actor) {
            return Err(DomainError::forbidden(
                "You are not a member of this workspace",
            ));
        }
        for (user, _) in &members {
            if !workspace.is_member(*user) {
                return Err(DomainError::validation(
                    "User must be a workspace member first",
                ));
            }
        }

        let mut members: Vec<ProjectMember> = members
            .into_iter()
            .map(|(user, role)| ProjectMember { user, role })
            .collect();
        if !members.iter().any(|m| m.user == actor) {
            members.push(ProjectMember {
                user: actor,
                role: ProjectRole::Manager,
            });
        }

        let project = Project::create(workspace_id, title, description, members, actor, now)?;
        self.collab.insert_project(project.clone())?;

        let actor_name = self.users.get(actor)?.name;
        self.notify(NotificationDraft {
            recipients: project.members.iter().map(|m| m.user).collect(),
            kind: NotificationType::ProjectAdded,
            title: "Added to a project".to_string(),
            message: format!("{actor_name} added you to the project \"{}\"", project.title),
            resource: Some(ResourceRef {
                kind: ResourceType::Project,
                id: *project.id.as_uuid(),
            }),
            actor: Some(actor),
            workspace: Some(workspace_id),
            metadata: Some(json!({
                "projectTitle": project.title,
                "actionByName": actor_name,
            })),
        });
        Ok(project)
    }

    pub fn list_projects(
        &self,
        actor: UserId,
        workspace_id: WorkspaceId,
    ) -> DomainResult<Vec<Project>> {
        let workspace = self.collab.workspace(workspace_id)?;
        if !workspace.is_member(actor) {
            return Err(DomainError::forbidden(
                "You are not a member of this workspace",
            ));
        }
        let projects = self.collab.projects_in(workspace_id)?;
        // Workspace owners/admins see everything; others only their own.
        let role = workspace.role_of(actor);
        Ok(projects
            .into_iter()
            .filter(|p| {
                effective_project_permission(role, p.role_of(actor)) != ProjectPermission::None
            })
            .collect())
    }

    pub fn get_project(&self, actor: UserId, id: ProjectId) -> DomainResult<Project> {
        let project = self.collab.project(id)?;
        if self.project_permission(actor, &project)? == ProjectPermission::None {
            return Err(DomainError::forbidden(
                "You are not a member of this project",
            ));
        }
        Ok(project)
    }

    /// Resolve the actor's effective permission on a project.
    fn project_permission(
        &self,
        actor: UserId,
        project: &Project,
    ) -> DomainResult<ProjectPermission> {
        let workspace = self.collab.workspace(project.workspace)?;
        Ok(effective_project_permission(
            workspace.role_of(actor),
            project.role_of(actor),
        ))
    }

    fn require_project_manager(&self, actor: UserId, project: &Project) -> DomainResult<()> {
        if !self.project_permission(actor, project)?.can_manage() {
            return Err(DomainError::forbidden(
                "You don't have permission to manage this project",
            ));
        }
        Ok(())
    }

    pub fn add_project_member(
        &self,
        actor: UserId,
        project_id: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> DomainResult<Project> {
        let current = self.collab.project(project_id)?;
        self.require_project_manager(actor, &current)?;

        let project = self.collab.update_project(project_id, |workspace, project| {
            graph::add_project_member(workspace, project, user, role)
        })?;

        let actor_name = self.users.get(actor)?.name;
        self.notify(NotificationDraft {
            recipients: vec![user],
            kind: NotificationType::ProjectMemberAdded,
            title: "Added to a project".to_string(),
            message: format!("{actor_name} added you to the project \"{}\"", project.title),
            resource: Some(ResourceRef {
                kind: ResourceType::Project,
                id: *project_id.as_uuid(),
            }),
            actor: Some(actor),
            workspace: Some(project.workspace),
            metadata: Some(json!({
                "projectTitle": project.title,
                "actionByName": actor_name,
            })),
        });
        Ok(project)
    }

    pub fn update_project_member_role(
        &self,
        actor: UserId,
        project_id: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> DomainResult<Project> {
        let current = self.collab.project(project_id)?;
        self.require_project_manager(actor, &current)?;

        self.collab.update_project(project_id, |_workspace, project| {
            graph::change_project_member_role(project, user, role).map(|_| ())
        })
    }

    pub fn remove_project_member(
        &self,
        actor: UserId,
        project_id: ProjectId,
        user: UserId,
    ) -> DomainResult<Project> {
        let current = self.collab.project(project_id)?;
        self.require_project_manager(actor, &current)?;

        self.collab.update_project(project_id, |_workspace, project| {
            graph::remove_project_member(project, user).map(|_| ())
        })
    }

    // ---- notifications ----

    pub fn list_notifications(
        &self,
        actor: UserId,
        unread_only: bool,
        page: usize,
        limit: usize,
    ) -> DomainResult<NotificationPage> {
        let limit = limit.clamp(1, 100);
        let offset = page.saturating_sub(1) * limit;
        self.notifications.list(actor, unread_only, limit, offset)
    }

    pub fn unread_count(&self, actor: UserId) -> DomainResult<usize> {
        self.notifications.unread_count(actor)
    }

    pub fn mark_notification_read(
        &self,
        actor: UserId,
        id: NotificationId,
    ) -> DomainResult<Notification> {
        self.notifications.mark_read(actor, id)
    }

    pub fn mark_all_notifications_read(&self, actor: UserId) -> DomainResult<usize> {
        self.notifications.mark_all_read(actor)
    }

    pub fn delete_notification(&self, actor: UserId, id: NotificationId) -> DomainResult<()> {
        self.notifications.delete(actor, id)
    }
}
