//! Help text covering general options plus the options each generator of
//! the resolved set declares.

use genrunner_core::generator::{Generator, GeneratorRegistry};
use std::collections::BTreeMap;

/// Column width for option names; longer names wrap the help text to the
/// next line.
const ARG_LENGTH: usize = 38;

pub fn print_usage(registry: &GeneratorRegistry, generator_set: Option<&str>) {
    println!("Usage:\n  genrunner [options] header-file typesystem-file\n");
    println!("General options:");
    print!("{}", render_options(&general_options()));

    let Some(set_name) = generator_set else {
        return;
    };
    let Ok(generators) = registry.resolve(set_name) else {
        return;
    };
    for generator in &generators {
        let options = generator.options();
        if !options.is_empty() {
            println!("\n{} options:", generator.name());
            print!("{}", render_options(&options));
        }
    }
}

fn general_options() -> BTreeMap<String, String> {
    BTreeMap::from(
        [
            (
                "project-file=<file>",
                "Text file containing a description of\nthe binding project. Supplies defaults\noverridden by command line arguments",
            ),
            ("debug-level=[sparse|medium|full]", "Set the debug level"),
            ("silent", "Avoid printing any message"),
            ("help", "Display this help and exit"),
            (
                "output-directory=<path>",
                "The directory where the generated\nfiles will be written",
            ),
            (
                "include-paths=<path>[:<path>:...]",
                "Include paths used by the C++ parser",
            ),
            (
                "typesystem-paths=<path>[:<path>:...]",
                "Paths used when searching for\ntypesystems",
            ),
            (
                "license-file=<license-file>",
                "File used for copyright headers of\ngenerated files",
            ),
            ("version", "Output version information and exit"),
            (
                "generator-set=<\"generator module\">",
                "generator-set to be used. e.g. qtdoc",
            ),
            (
                "api-version=<\"version\">",
                "Specify the supported api version used\nto generate the bindings",
            ),
            (
                "max-instances=<\"max\">",
                "Limits the number of genrunner\ninstances that can be called at the\nsame time",
            ),
            (
                "coordination-key=<key>",
                "Name of the instance pool to compete\nin; required with max-instances",
            ),
            (
                "set <key>=<value>",
                "Pass a generator-specific option,\nrepeatable",
            ),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string())),
    )
}

/// Render options as an aligned two-column table. Multi-line help text
/// continues in the second column.
fn render_options(options: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (name, help) in options {
        out.push_str(&format!("  --{name:<ARG_LENGTH$}"));
        if name.len() > ARG_LENGTH {
            out.push('\n');
            out.push_str(&" ".repeat(ARG_LENGTH + 4));
        }
        let mut lines = help.lines();
        if let Some(first) = lines.next() {
            out.push_str(first);
        }
        out.push('\n');
        for line in lines {
            out.push_str(&" ".repeat(ARG_LENGTH + 4));
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
