use console::style;

use scrub3mf::ScrubReport;

const HEADER_WIDTH: usize = 74;

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ scrub3mf · Limpieza de metadata en proyectos 3MF ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn render_report(output: &str, report: &ScrubReport) {
    println!(
        "{}",
        style(format!("┌─ Proyecto limpio guardado en {}", output)).green()
    );
    for entry in &report.replaced {
        println!("{}", style(format!("│   • {}", entry)).green());
    }
    println!(
        "{}",
        style(format!(
            "│ {} entradas reescritas, {} copiadas sin cambios",
            report.replaced.len(),
            report.copied
        ))
        .green()
        .dim()
    );
    println!("{}\n", style("└─").green());
}

pub fn render_error(message: &str) {
    eprintln!("{}", style("┌─ No se pudo limpiar el proyecto").red().bold());
    eprintln!("{}", style(format!("│ {}", message)).red());
    eprintln!("{}", style("└─").red());
}
