//! Member command - add people to a group

use anyhow::Result;
use clap::Subcommand;

use dvvy_core::services::LogEvent;

use super::{get_logger, load_group, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to a group
    Add {
        /// Group id or name
        group: String,
        /// Member name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: MemberCommands) -> Result<()> {
    match command {
        MemberCommands::Add { group, name, json } => {
            let (ctx, group) = load_group(&group)?;
            if group.members.iter().any(|m| m.name.eq_ignore_ascii_case(name.trim())) {
                output::warning(&format!(
                    "{} already has a member named {}; refer to them by id from now on",
                    group.name,
                    name.trim()
                ));
            }

            let member = ctx.group_service.add_member(&group.id, &name)?;
            log_event(
                &get_logger(),
                LogEvent::new("member_added").with_group(&group.id).with_command("member add"),
            );

            if json {
                return output::json(&member);
            }
            output::success(&format!("Added {} to {} ({})", member.name, group.name, member.id));
            Ok(())
        }
    }
}
