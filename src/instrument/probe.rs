//! Probe statements and the tracer support class
//!
//! @module instrument/probe

use std::path::PathBuf;

use super::map::TraceId;
use crate::core::config::InstrumentConfig;
use crate::core::error::Result;

/// Generates probe text for one tracer class
#[derive(Debug, Clone)]
pub struct Probe {
    tracer_class: String,
    package: Option<String>,
    class_name: String,
    trace_file: String,
}

impl Probe {
    pub fn new(config: &InstrumentConfig) -> Result<Self> {
        let (package, class_name) = config.tracer_parts()?;
        Ok(Self {
            tracer_class: config.tracer_class.trim().to_string(),
            package: package.map(str::to_string),
            class_name: class_name.to_string(),
            trace_file: config.trace_file.clone(),
        })
    }

    /// Call prefix identifying an already-instrumented source
    pub fn marker(&self) -> String {
        format!("{}.trace(", self.tracer_class)
    }

    /// Statement injected right after a block's opening brace
    pub fn statement(&self, id: TraceId) -> String {
        format!(" {}.trace({});", self.tracer_class, id)
    }

    /// Relative path of the support class (`runvis/Tracer.java`)
    pub fn support_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if let Some(package) = &self.package {
            for part in package.split('.') {
                path.push(part);
            }
        }
        path.push(format!("{}.java", self.class_name));
        path
    }

    /// Source of the support class. `trace` never throws: any I/O failure
    /// is swallowed so the instrumented program behaves like the original.
    pub fn support_source(&self) -> String {
        let package = self
            .package
            .as_ref()
            .map(|p| format!("package {};\n\n", p))
            .unwrap_or_default();
        let trace_file = self.trace_file.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            r#"{package}import java.io.FileWriter;
import java.io.IOException;

public final class {class} {{
    private static FileWriter out;
    private static boolean failed;

    private {class}() {{
    }}

    public static synchronized void trace(int id) {{
        if (failed) {{
            return;
        }}
        try {{
            if (out == null) {{
                out = new FileWriter("{file}", false);
            }}
            out.write(id + "\n");
            out.flush();
        }} catch (IOException | RuntimeException e) {{
            failed = true;
        }}
    }}
}}
"#,
            package = package,
            class = self.class_name,
            file = trace_file,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe() {
        let probe = Probe::new(&InstrumentConfig::default()).unwrap();
        assert_eq!(probe.statement(7), " runvis.Tracer.trace(7);");
        assert_eq!(probe.marker(), "runvis.Tracer.trace(");
        assert_eq!(probe.support_path(), PathBuf::from("runvis/Tracer.java"));

        let src = probe.support_source();
        assert!(src.starts_with("package runvis;"));
        assert!(src.contains("public final class Tracer"));
        assert!(src.contains("new FileWriter(\"Trace.tr\", false)"));
    }

    #[test]
    fn test_default_package_probe() {
        let config = InstrumentConfig {
            tracer_class: "Probe".into(),
            trace_file: "out.tr".into(),
        };
        let probe = Probe::new(&config).unwrap();
        assert_eq!(probe.support_path(), PathBuf::from("Probe.java"));
        assert!(probe.support_source().starts_with("import java.io.FileWriter;"));
    }
}
