//! Line-oriented operator console
//!
//! Reads commands from an async line source and writes replies to a sink.
//! `via <args...>` goes to the routing command handler.

use hopgate_router::{CommandOutcome, RouteTable, RoutingCommandHandler};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const HELP: &str = "\
commands:
  via list                                   show routing entries
  via default <descriptor>                   replace the default route
  via reject <target>                        refuse connections to target
  via add <target> <descriptor> [priority]   add a routing entry
  via remove <id>                            remove a routing entry
  help                                       show this text
  quit | exit                                end the session

descriptors: reject | none | [socks|socks4|socks4a|socks5://][user[:pass]@]host[:port]
";

/// Result of handling one console line
#[derive(Debug, PartialEq)]
pub enum Reply {
    /// Nothing to print
    Silent,
    Output(String),
    Quit,
}

pub struct Console {
    handler: RoutingCommandHandler,
}

impl Console {
    pub fn new(handler: RoutingCommandHandler) -> Self {
        Self { handler }
    }

    pub fn handle_line(&self, line: &str) -> Reply {
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => Reply::Silent,
            ["help"] => Reply::Output(HELP.to_string()),
            ["quit"] | ["exit"] => Reply::Quit,
            ["via", args @ ..] => match self.handler.run(args) {
                Ok(outcome) => render_outcome(outcome),
                Err(e) => Reply::Output(format!("error: {}\n", e)),
            },
            _ => Reply::Output("error: unknown command\n".to_string()),
        }
    }

    /// Serve the console until `quit`, `exit` or end of input
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line) {
                Reply::Silent => {}
                Reply::Output(text) => {
                    output.write_all(text.as_bytes()).await?;
                    output.flush().await?;
                }
                Reply::Quit => break,
            }
        }

        debug!("Console session ended");
        Ok(())
    }
}

fn render_outcome(outcome: CommandOutcome) -> Reply {
    match outcome {
        CommandOutcome::Listed(table) => Reply::Output(render_table(&table)),
        CommandOutcome::DefaultSet(id) => Reply::Output(format!("default route is entry {}\n", id)),
        CommandOutcome::Added(id) => Reply::Output(format!("added entry {}\n", id)),
        CommandOutcome::Removed { id, existed: true } => {
            Reply::Output(format!("removed entry {}\n", id))
        }
        CommandOutcome::Removed { existed: false, .. } => Reply::Silent,
    }
}

/// Render the rule table with every column padded to its widest cell
pub fn render_table(table: &RouteTable) -> String {
    let mut rows: Vec<[String; 5]> = vec![[
        "Id:".to_string(),
        "Host:".to_string(),
        "Port:".to_string(),
        "Prio:".to_string(),
        "Target:".to_string(),
    ]];
    rows.extend(table.entries().iter().map(|entry| {
        [
            entry.id.to_string(),
            entry.target.host.clone(),
            entry.target.port.clone(),
            entry.priority.to_string(),
            entry.handler.to_string(),
        ]
    }));

    let mut widths = [0usize; 5];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i + 1 == row.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$} ", cell, width = widths[i]));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
