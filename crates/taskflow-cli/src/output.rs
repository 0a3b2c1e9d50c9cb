//! Plain-text rendering for the CLI.

use taskflow_core::models::{Project, ProjectMember, Task, User};
use taskflow_core::notifications::{ToastKind, Toasts};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

pub fn print_toasts(toasts: &mut Toasts) {
    for toast in toasts.drain() {
        match toast.kind {
            ToastKind::Error | ToastKind::Warning => eprintln!("[{}] {}", toast.kind, toast.message),
            ToastKind::Success | ToastKind::Info => println!("{}", toast.message),
        }
    }
}

pub fn print_user(user: &User) {
    println!("{} <{}>", user.display_name(), user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", user.system_role.as_str());
}

pub fn print_projects(projects: &[Project], current: Option<&Project>) {
    if projects.is_empty() {
        println!("No projects yet. Create one with `taskflow projects create <name>`.");
        return;
    }
    for project in projects {
        let marker = if current.map(|c| c.id == project.id).unwrap_or(false) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<36}  {:<24}  {}",
            marker,
            project.id,
            truncate(&project.name, 24),
            truncate(&project.description, 40)
        );
    }
}

pub fn print_members(members: &[ProjectMember]) {
    if members.is_empty() {
        println!("No members.");
        return;
    }
    for member in members {
        println!(
            "{:<36}  {:<7}  {:<24}  {}",
            member.user_id,
            member.role.as_str(),
            truncate(&member.name, 24),
            member.email
        );
    }
}

pub fn print_tasks(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        let due = task.due_date.as_deref().map(|d| d.chars().take(10).collect::<String>());
        println!(
            "{:<36}  {:<11}  {:<6}  {:<10}  {}",
            task.id,
            task.status.display_name(),
            task.priority.as_str(),
            due.as_deref().unwrap_or("-"),
            truncate(&task.title, 50)
        );
    }
}

pub fn print_users(users: &[User]) {
    for user in users {
        println!(
            "{:<36}  {:<5}  {:<24}  {}",
            user.id,
            user.system_role.as_str(),
            truncate(user.display_name(), 24),
            user.email
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long project name", 10), "a long ...");
        assert_eq!(truncate("abcdef", 3), "abc");
    }
}
