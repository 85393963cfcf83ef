//! taskflow activity and actor command implementations.

use serde::Serialize;

use crate::cli::{ActorCommands, CommandContext};
use crate::employee;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub(crate) fn run_show(ctx: &CommandContext, limit: Option<usize>) -> Result<()> {
    let doc = ctx.store.load()?;
    let shown: Vec<_> = match limit {
        Some(limit) => doc.activity.iter().take(limit).cloned().collect(),
        None => doc.activity.clone(),
    };

    let mut human = HumanOutput::new(format!("{} activity entries", shown.len()));
    for entry in &shown {
        human.push_detail(format!(
            "{} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.actor_name,
            entry.message
        ));
    }
    emit_success(ctx.options, "activity", &shown, Some(&human))
}

pub(crate) fn run_actor(ctx: &CommandContext, command: ActorCommands) -> Result<()> {
    match command {
        ActorCommands::Set { name } => {
            employee::persist_actor(&ctx.root, &name)?;
            let human = HumanOutput::new(format!("Actor set to {name}"));
            emit_success(ctx.options, "actor set", &name, Some(&human))
        }
        ActorCommands::Show => {
            let doc = ctx.store.load()?;
            let resolved = employee::find_employee(&doc.employees, &ctx.actor);

            #[derive(Serialize)]
            struct ActorView {
                actor: String,
                #[serde(skip_serializing_if = "Option::is_none")]
                employee_id: Option<String>,
                #[serde(skip_serializing_if = "Option::is_none")]
                name: Option<String>,
                admin: bool,
            }
            let view = ActorView {
                actor: ctx.actor.clone(),
                employee_id: resolved.map(|employee| employee.id.clone()),
                name: resolved.map(|employee| employee.name.clone()),
                admin: resolved.map(|employee| employee.role.is_admin()).unwrap_or(false),
            };

            let mut human = HumanOutput::new(format!("Actor: {}", ctx.actor));
            match resolved {
                Some(employee) => {
                    human.push_summary("employee", format!("{} ({})", employee.name, employee.id));
                    human.push_summary("admin", employee.role.is_admin().to_string());
                }
                None => human.push_warning("not in the workspace roster".to_string()),
            }
            emit_success(ctx.options, "actor show", &view, Some(&human))
        }
    }
}
