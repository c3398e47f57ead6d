use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: String,
}

impl FileWriter {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing explorer tree to file: {}", self.path);
        fs::write(Path::new(&self.path), content)?;
        info!("Explorer tree written to file: {}", self.path);
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing explorer tree to console");
        let mut stdout = io::stdout();
        stdout.execute(SetForegroundColor(Color::Cyan))?;
        writeln!(stdout, "\nExplorer")?;
        stdout.execute(ResetColor)?;
        stdout.write_all(content.as_bytes())?;
        Ok(())
    }
}

pub fn create_writer(output_path: &Option<String>) -> Box<dyn OutputWriter> {
    match output_path {
        Some(path) => Box::new(FileWriter::new(path.clone())) as Box<dyn OutputWriter>,
        None => Box::new(ConsoleWriter) as Box<dyn OutputWriter>,
    }
}

pub fn write_output(rendered_tree: &str, output_path: &Option<String>) -> anyhow::Result<()> {
    create_writer(output_path).write(rendered_tree)
}
