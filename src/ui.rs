use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a key-value pair to stderr
pub fn ekv(key: &str, value: &str) {
    eprintln!("  {}: {}", key.dimmed(), value);
}

/// Render a flag as yes/no
pub fn yes_no(flag: bool) -> String {
    if flag {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

/// Print the outcome of reconciling one instance
pub fn reconcile_result(result: &db2kit::ReconcileResult) {
    if result.changed {
        success(&format!("{}: changed", result.instance.bold()));
    } else {
        info(&format!("{}: already in desired state", result.instance.bold()));
    }
    kv("created", &yes_no(result.created));
    kv("started", &yes_no(result.started));
    kv("dropped", &yes_no(result.dropped));
    if let Some(command) = &result.lifecycle_command {
        kv("lifecycle command", command);
    }
    for update in &result.config_updates {
        dim(update);
    }
}

/// Print a library error with its category and advice
pub fn db2_error(err: &db2kit::Error) {
    let category = err.category();
    error(category.description());
    match err {
        db2kit::Error::CommandFailed {
            command,
            code,
            stdout,
            stderr,
        } => print_failed_command(command, *code, stdout, stderr),
        db2kit::Error::PartiallyApplied { applied, source } => {
            for update in applied {
                ekv("applied", update);
            }
            if let db2kit::Error::CommandFailed {
                command,
                code,
                stdout,
                stderr,
            } = source.as_ref()
            {
                print_failed_command(command, *code, stdout, stderr);
            } else {
                ekv("error", &source.to_string());
            }
        }
        other => ekv("error", &other.to_string()),
    }
    ekv("hint", category.advice());
}

fn print_failed_command(command: &str, code: i32, stdout: &str, stderr: &str) {
    ekv("command", command);
    ekv("rc", &code.to_string());
    ekv("stdout", stdout.trim_end());
    ekv("stderr", stderr.trim_end());
}
