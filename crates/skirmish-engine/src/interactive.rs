//! Line-based front end for the roster [`Editor`].
//!
//! Reads one command per line from any [`BufRead`] and writes replies to
//! any [`Write`], so tests can drive it with in-memory buffers.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::editor::Editor;

const HELP: &str = "\
Commands:
  add <kind> <name> <x> <y>  - Add an Orc, Druid or Squirrel
  remove <name>              - Remove an agent
  list                       - Show all agents
  save <file>                - Save living agents to a roster file
  load <file>                - Replace agents with a roster file
  battle <radius>            - Fight one round within <radius>
  help                       - Show this help
  quit                       - Exit";

/// Interactive session over an input and an output stream.
pub struct InteractiveEditor<R, W> {
    editor: Editor,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveEditor<R, W> {
    /// Wrap `editor` with the given streams.
    pub const fn new(editor: Editor, input: R, output: W) -> Self {
        Self {
            editor,
            input,
            output,
        }
    }

    /// Hand back the editor and the output stream.
    #[cfg(test)]
    pub fn into_parts(self) -> (Editor, W) {
        (self.editor, self.output)
    }

    /// Run until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let bounds = self.editor.bounds();
        writeln!(self.output, "Skirmish roster editor")?;
        writeln!(
            self.output,
            "Map is {}x{}. Type help for commands, quit to exit",
            bounds.width(),
            bounds.height()
        )?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if self.handle_command(input)? {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command. Returns `true` when the session should end.
    fn handle_command(&mut self, input: &str) -> io::Result<bool> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&cmd, args)) = parts.split_first() else {
            return Ok(false);
        };

        match (cmd, args) {
            ("quit" | "exit", _) => {
                writeln!(self.output, "Bye")?;
                return Ok(true);
            }
            ("help", _) => writeln!(self.output, "{HELP}")?,
            ("add", [kind, name, x, y]) => self.add(kind, name, x, y)?,
            ("add", _) => writeln!(self.output, "Usage: add <kind> <name> <x> <y>")?,
            ("remove", [name]) => {
                if self.editor.remove(name) {
                    writeln!(self.output, "Removed {name}")?;
                } else {
                    writeln!(self.output, "No agent named {name}")?;
                }
            }
            ("remove", _) => writeln!(self.output, "Usage: remove <name>")?,
            ("list", _) => self.list()?,
            ("save", [file]) => match self.editor.save(Path::new(file)) {
                Ok(saved) => writeln!(self.output, "Saved {saved} agents to {file}")?,
                Err(e) => writeln!(self.output, "Error: {e}")?,
            },
            ("save", _) => writeln!(self.output, "Usage: save <file>")?,
            ("load", [file]) => match self.editor.load(Path::new(file)) {
                Ok(summary) => writeln!(
                    self.output,
                    "Loaded {} agents from {file} ({} malformed lines, {} rejected)",
                    summary.loaded, summary.malformed, summary.rejected
                )?,
                Err(e) => writeln!(self.output, "Error: {e}")?,
            },
            ("load", _) => writeln!(self.output, "Usage: load <file>")?,
            ("battle", [radius]) => self.battle(radius)?,
            ("battle", _) => writeln!(self.output, "Usage: battle <radius>")?,
            _ => writeln!(self.output, "Unknown command: {cmd} (try help)")?,
        }
        Ok(false)
    }

    fn add(&mut self, kind: &str, name: &str, x: &str, y: &str) -> io::Result<()> {
        let (Ok(x), Ok(y)) = (x.parse::<i32>(), y.parse::<i32>()) else {
            return writeln!(self.output, "Error: coordinates must be integers");
        };
        match self.editor.add(kind, name, x, y) {
            Ok(()) => writeln!(self.output, "Added {name}"),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn list(&mut self) -> io::Result<()> {
        if self.editor.agents().is_empty() {
            return writeln!(self.output, "No agents");
        }
        for agent in self.editor.agents() {
            writeln!(
                self.output,
                "  {:<12} {:<8} at {}",
                agent.name(),
                agent.kind(),
                agent.position()
            )?;
        }
        writeln!(self.output, "{} agents", self.editor.agents().len())
    }

    fn battle(&mut self, radius: &str) -> io::Result<()> {
        let Ok(radius) = radius.parse::<f64>() else {
            return writeln!(self.output, "Error: radius must be a number");
        };
        match self.editor.battle_round(radius) {
            Ok(summary) => writeln!(
                self.output,
                "{} engagements, {} killed, {} remain",
                summary.engagements,
                summary.kills,
                self.editor.alive_count()
            ),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }
}
