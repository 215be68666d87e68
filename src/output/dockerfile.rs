//! Dockerfile rendering for the resolved image model

use crate::models::DockerModel;

/// Directory inside the image that holds the executable
pub const APP_HOME: &str = "/home/app/";

pub const DOCKERFILE: &str = "Dockerfile";

/// Renders the Dockerfile for `model`
///
/// Copy files are read from their staged paths next to the Dockerfile; the
/// handler places them there before the file is written.
pub fn render_dockerfile(model: &DockerModel) -> String {
    let mut lines = vec![
        "# Auto Generated Dockerfile".to_string(),
        format!("FROM {}", model.base_image),
        String::new(),
        format!("WORKDIR {}", APP_HOME),
        format!("COPY {} {}", model.jar_file_name, APP_HOME),
    ];

    for (copy, staged) in model.staged_copy_files() {
        lines.push(format!("COPY {} {}", staged, copy.target));
    }

    if !model.ports.is_empty() {
        lines.push(String::new());
    }
    lines.extend(model.ports.iter().map(|port| format!("EXPOSE {}", port)));

    lines.push(String::new());
    lines.push(format!("CMD {}", command_line(model)));

    let mut dockerfile = lines.join("\n");
    dockerfile.push('\n');
    dockerfile
}

fn command_line(model: &DockerModel) -> String {
    let mut command = match model.cmd.as_deref() {
        Some(cmd) => cmd.to_string(),
        None => format!("java -jar {}", model.jar_file_name),
    };
    for arg in &model.command_args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}
