//! Operator commands for managing the rule table
//!
//! | command   | arguments                             |
//! |-----------|---------------------------------------|
//! | `list`    |                                       |
//! | `default` | `<descriptor>`                        |
//! | `reject`  | `<target>`                            |
//! | `add`     | `<target> <descriptor> [priority]`    |
//! | `remove`  | `<id>`                                |

use crate::builder::{UpstreamChainBuilder, REJECT_DESCRIPTOR};
use crate::error::RoutingError;
use crate::priority::{coerce_priority, DEFAULT_PRIORITY, REJECT_PRIORITY, STANDARD_PRIORITY};
use crate::store::{EntryId, RouteTable, RoutingRuleStore};
use crate::target::TargetPattern;
use std::sync::Arc;
use tracing::debug;

/// A validated operator command
#[derive(Debug, Clone, PartialEq)]
pub enum ViaCommand {
    List,
    SetDefault {
        descriptor: String,
    },
    Reject {
        target: TargetPattern,
    },
    Add {
        target: TargetPattern,
        descriptor: String,
        /// Raw priority text, coerced once the descriptor has been built
        priority: Option<String>,
    },
    Remove {
        id: EntryId,
    },
}

impl ViaCommand {
    /// Validate raw command arguments (sub-command first)
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, RoutingError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        match args.as_slice() {
            ["list"] => Ok(ViaCommand::List),
            ["default", descriptor] => Ok(ViaCommand::SetDefault {
                descriptor: descriptor.to_string(),
            }),
            ["reject", target] => Ok(ViaCommand::Reject {
                target: TargetPattern::parse(target),
            }),
            ["add", target, descriptor, rest @ ..] if rest.len() <= 1 => Ok(ViaCommand::Add {
                target: TargetPattern::parse(target),
                descriptor: descriptor.to_string(),
                priority: rest.first().map(|text| text.to_string()),
            }),
            ["remove", id] => id
                .parse()
                .map(|id| ViaCommand::Remove { id })
                .map_err(|_| RoutingError::usage(format!("'{}' is not an entry id", id))),
            _ => Err(RoutingError::usage(
                "expected list | default <descriptor> | reject <target> | add <target> <descriptor> [priority] | remove <id>",
            )),
        }
    }
}

/// What a successfully executed command did
#[derive(Debug)]
pub enum CommandOutcome {
    Listed(Arc<RouteTable>),
    DefaultSet(EntryId),
    Added(EntryId),
    /// `existed` is `false` when the id was unknown, which is not an error
    Removed { id: EntryId, existed: bool },
}

/// Applies operator commands to a rule store
pub struct RoutingCommandHandler {
    builder: UpstreamChainBuilder,
    store: Arc<RoutingRuleStore>,
}

impl RoutingCommandHandler {
    pub fn new(builder: UpstreamChainBuilder, store: Arc<RoutingRuleStore>) -> Self {
        Self { builder, store }
    }

    pub fn store(&self) -> &Arc<RoutingRuleStore> {
        &self.store
    }

    /// Parse and execute raw arguments
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<CommandOutcome, RoutingError> {
        self.execute(ViaCommand::parse(args)?)
    }

    /// Execute a command. On error the store is left unchanged.
    pub fn execute(&self, command: ViaCommand) -> Result<CommandOutcome, RoutingError> {
        match command {
            ViaCommand::List => Ok(CommandOutcome::Listed(self.store.snapshot())),
            ViaCommand::SetDefault { descriptor } => {
                let handler = self.builder.build(&descriptor)?;
                Ok(CommandOutcome::DefaultSet(self.store.set_default(handler)))
            }
            ViaCommand::Reject { target } => {
                let handler = self.builder.build(REJECT_DESCRIPTOR)?;
                Ok(CommandOutcome::Added(
                    self.store.add(handler, target, REJECT_PRIORITY),
                ))
            }
            ViaCommand::Add {
                target,
                descriptor,
                priority,
            } => {
                // descriptor errors take precedence over priority errors
                let handler = self.builder.build(&descriptor)?;
                let priority = add_priority(priority.as_deref())?;
                Ok(CommandOutcome::Added(self.store.add(handler, target, priority)))
            }
            ViaCommand::Remove { id } => {
                let existed = self.store.remove(id);
                if !existed {
                    debug!("remove: no entry with id {}", id);
                }
                Ok(CommandOutcome::Removed { id, existed })
            }
        }
    }
}

/// Priority for `add`: [`STANDARD_PRIORITY`] when omitted, never the default sentinel
fn add_priority(text: Option<&str>) -> Result<f64, RoutingError> {
    let priority = match text {
        Some(text) => coerce_priority(text)?,
        None => STANDARD_PRIORITY,
    };
    if priority == DEFAULT_PRIORITY {
        return Err(RoutingError::invalid_priority(format!(
            "{} is reserved for the default route",
            DEFAULT_PRIORITY
        )));
    }
    Ok(priority)
}
