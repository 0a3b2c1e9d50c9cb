//! Command handlers. Each one works through the shared `App` context.

use anyhow::{anyhow, bail, Result};
use taskflow_core::api::ApiError;
use taskflow_core::models::{
    CreateProjectRequest, CreateTaskRequest, ProjectMember, UpdateProjectRequest, UpdateTaskRequest,
};
use taskflow_core::App;

use crate::output;
use crate::{AdminCommand, Command, ProjectCommand, TaskCommand};

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(app, email, password).await,
        Command::Register {
            email,
            name,
            password,
        } => register(app, email, name, password).await,
        Command::Logout => {
            app.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami { remote } => whoami(app, remote).await,
        Command::Projects(cmd) => {
            require_session(app)?;
            projects(app, cmd).await
        }
        Command::Tasks(cmd) => {
            require_session(app)?;
            tasks(app, cmd).await
        }
        Command::Admin(cmd) => {
            require_session(app)?;
            admin(app, cmd).await
        }
    }
}

fn require_session(app: &App) -> Result<()> {
    if app.is_authenticated() {
        Ok(())
    } else {
        bail!("Not logged in. Run `taskflow login` first.")
    }
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

/// Report a failed call through the toast queue and abort the command.
fn fail(app: &mut App, error: ApiError, fallback: &str) -> anyhow::Error {
    app.report(&error, fallback);
    anyhow!("{}", fallback)
}

async fn login(app: &mut App, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = password_or_prompt(password)?;

    let user = app.login(&email, &password).await?;
    println!("Logged in as {}.", user.display_name());
    Ok(())
}

async fn register(app: &mut App, email: String, name: String, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = app.register(&email, &password, &name).await?;
    println!("Welcome, {}!", user.display_name());
    Ok(())
}

async fn whoami(app: &mut App, remote: bool) -> Result<()> {
    require_session(app)?;
    if remote {
        match app.api.current_user().await {
            Ok(user) => output::print_user(&user),
            Err(e) => return Err(fail(app, e, "Failed to fetch user")),
        }
    } else if let Some(user) = app.session.user() {
        output::print_user(&user);
    }
    Ok(())
}

/// The explicit project id, or the active one.
async fn resolve_project(app: &mut App, project: Option<String>) -> Result<String> {
    if let Some(id) = project {
        return Ok(id);
    }
    if !app.load_projects().await {
        bail!("Failed to load projects");
    }
    app.projects
        .current_project()
        .map(|p| p.id.clone())
        .ok_or_else(|| anyhow!("No active project. Create one with `taskflow projects create <name>`."))
}

/// Advisory check before member management; the server has the final say.
async fn require_member_manager(app: &mut App, project_id: &str, change_roles: bool) -> Result<()> {
    let Some(user) = app.session.user() else {
        bail!("Not logged in. Run `taskflow login` first.");
    };
    if user.is_admin() {
        return Ok(());
    }

    let members = match app.api.list_members(project_id).await {
        Ok(members) => members,
        Err(e) => return Err(fail(app, e, "Failed to load members")),
    };
    let allowed = ProjectMember::role_of(&members, &user.id)
        .map(|role| {
            if change_roles {
                role.can_change_roles()
            } else {
                role.can_manage_members()
            }
        })
        .unwrap_or(false);

    if allowed {
        Ok(())
    } else if change_roles {
        bail!("Access denied: Only PO can update member roles")
    } else {
        bail!("Access denied: Only PO and PM can access settings")
    }
}

async fn projects(app: &mut App, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::List => {
            if !app.load_projects().await {
                bail!("Failed to load projects");
            }
            output::print_projects(app.projects.projects(), app.projects.current_project());
        }
        ProjectCommand::Use { project_id } => {
            if !app.load_projects().await {
                bail!("Failed to load projects");
            }
            if !app.projects.select_by_id(&project_id)? {
                bail!("Project {} not found", project_id);
            }
            println!("Active project: {}", project_id);
        }
        ProjectCommand::Clear => {
            app.projects.set_current_project(None)?;
            println!("Active project cleared.");
        }
        ProjectCommand::Create { name, description } => {
            let request = CreateProjectRequest {
                name: name.trim().to_string(),
                description,
            };
            let project = match app.api.create_project(&request).await {
                Ok(project) => project,
                Err(e) => return Err(fail(app, e, "Failed to create project")),
            };
            app.toasts.success("Project created successfully!");
            app.load_projects().await;
            app.projects.set_current_project(Some(project))?;
        }
        ProjectCommand::Rename {
            project_id,
            name,
            description,
        } => {
            let request = UpdateProjectRequest { name, description };
            if let Err(e) = app.api.update_project(&project_id, &request).await {
                return Err(fail(app, e, "Failed to update project"));
            }
            app.toasts.success("Project updated successfully!");
        }
        ProjectCommand::Delete { project_id } => {
            if let Err(e) = app.api.delete_project(&project_id).await {
                return Err(fail(app, e, "Failed to delete project"));
            }
            app.toasts.success("Project deleted successfully!");
            if app.projects.persisted_project_id().as_deref() == Some(project_id.as_str()) {
                app.projects.set_current_project(None)?;
            }
            app.load_projects().await;
        }
        ProjectCommand::Members { project_id } => {
            let project_id = resolve_project(app, project_id).await?;
            match app.api.list_members(&project_id).await {
                Ok(members) => output::print_members(&members),
                Err(e) => return Err(fail(app, e, "Failed to load members")),
            }
        }
        ProjectCommand::Invite {
            email,
            role,
            project,
        } => {
            if !role.is_assignable() {
                bail!("Invalid role. Must be PM, Member, or Viewer");
            }
            let project_id = resolve_project(app, project).await?;
            require_member_manager(app, &project_id, false).await?;
            if let Err(e) = app.api.invite_member(&project_id, &email, role).await {
                return Err(fail(app, e, "Failed to invite member"));
            }
            app.toasts.success(format!("Invited {} as {}", email.trim(), role));
        }
        ProjectCommand::SetRole {
            user_id,
            role,
            project,
        } => {
            if !role.is_assignable() {
                bail!("Invalid role. Must be PM, Member, or Viewer");
            }
            let project_id = resolve_project(app, project).await?;
            require_member_manager(app, &project_id, true).await?;
            if let Err(e) = app.api.update_member_role(&project_id, &user_id, role).await {
                return Err(fail(app, e, "Failed to update role"));
            }
            app.toasts.success("Role updated successfully!");
        }
        ProjectCommand::Remove { user_id, project } => {
            let project_id = resolve_project(app, project).await?;
            require_member_manager(app, &project_id, false).await?;
            if let Err(e) = app.api.remove_member(&project_id, &user_id).await {
                return Err(fail(app, e, "Failed to remove member"));
            }
            app.toasts.success("Member removed successfully!");
        }
    }
    Ok(())
}

async fn tasks(app: &mut App, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::List { status } => {
            if !app.refresh_tasks().await {
                bail!("Failed to load tasks");
            }
            app.task_filter = status;
            output::print_tasks(&app.visible_tasks());
        }
        TaskCommand::Create {
            title,
            description,
            priority,
            status,
            due,
            project,
        } => {
            if project.is_none() {
                app.load_projects().await;
            }
            let mut request = CreateTaskRequest::new(title.trim());
            request.description = description;
            request.priority = priority;
            request.status = status;
            request.due_date = due;
            request.project_id = project;
            let task = app.create_task(request).await?;
            println!("{}", task.id);
        }
        TaskCommand::Update {
            task_id,
            title,
            description,
            priority,
            due,
        } => {
            let current = match app.api.get_task(&task_id).await {
                Ok(task) => task,
                Err(e) => return Err(fail(app, e, "Failed to load task")),
            };
            let mut update = UpdateTaskRequest::from(&current);
            if let Some(title) = title {
                update.title = title;
            }
            if let Some(description) = description {
                update.description = description;
            }
            if let Some(priority) = priority {
                update.priority = priority;
            }
            if due.is_some() {
                update.due_date = due;
            }
            app.update_task(&task_id, &update).await?;
        }
        TaskCommand::Status { task_id, status } => {
            app.change_task_status(&task_id, status).await?;
        }
        TaskCommand::Delete { task_id } => {
            app.delete_task(&task_id).await?;
        }
    }
    Ok(())
}

async fn admin(app: &mut App, command: AdminCommand) -> Result<()> {
    if !app.can_access_admin() {
        bail!("Admin access required");
    }
    match command {
        AdminCommand::Users => match app.api.list_users().await {
            Ok(users) => output::print_users(&users),
            Err(e) => return Err(fail(app, e, "Failed to load users")),
        },
        AdminCommand::DeleteUser { user_id } => {
            if app.session.user().map(|u| u.id == user_id).unwrap_or(false) {
                bail!("Cannot delete your own account");
            }
            if let Err(e) = app.api.delete_user(&user_id).await {
                return Err(fail(app, e, "Failed to delete user"));
            }
            app.toasts.success("User deleted successfully!");
        }
    }
    Ok(())
}
