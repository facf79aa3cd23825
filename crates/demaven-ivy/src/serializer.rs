//! Hand-indented `ivy.xml` output.

use crate::descriptor::Descriptor;
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::{self, Write};

/// Renders `descriptor` as an Ivy 2.0 module descriptor.
pub fn to_xml(descriptor: &Descriptor) -> String {
    IvyXml(descriptor).to_string()
}

/// Display adapter producing the `ivy.xml` text of a descriptor.
pub struct IvyXml<'a>(pub &'a Descriptor);

impl fmt::Display for IvyXml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        let marker = d.marker();

        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(f)?;
        writeln!(f, "<ivy-module version=\"2.0\"")?;
        writeln!(f, "            xmlns:e=\"http://ant.apache.org/ivy/extra\"")?;
        writeln!(f, "            xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"")?;
        writeln!(
            f,
            "            xsi:noNamespaceSchemaLocation=\"http://ant.apache.org/ivy/schemas/ivy.xsd\">"
        )?;
        writeln!(f)?;
        writeln!(f, "  <info e:maven=\"{}\"", escape(d.maven_id()))?;
        writeln!(f, "        organisation=\"{}\"", escape(marker.organisation()))?;
        writeln!(f, "        module=\"{}\"", escape(marker.module()))?;
        writeln!(f, "        revision=\"{}\"", escape(&marker.revision().to_string()))?;
        writeln!(f, "        publication=\"{}\"", d.publication_string())?;

        if d.licenses().is_empty() && d.home_page().is_none() && d.description().is_none() {
            writeln!(f, "        status=\"release\"/>")?;
        } else {
            writeln!(f, "        status=\"release\">")?;
            write_info_body(f, d)?;
            writeln!(f)?;
            writeln!(f, "  </info>")?;
        }

        writeln!(f)?;
        writeln!(f, "  <configurations>")?;
        writeln!(f, "    <conf name=\"default\"/>")?;
        writeln!(f, "  </configurations>")?;

        if !d.artifacts().is_empty() {
            writeln!(f)?;
            writeln!(f, "  <publications>")?;
            for (kind, url) in d.artifacts() {
                writeln!(
                    f,
                    "    <artifact name=\"{}\" type=\"{}\" ext=\"{}\" url=\"{}\"/>",
                    escape(marker.module()),
                    kind,
                    kind.extension(),
                    escape(url.as_str())
                )?;
            }
            writeln!(f, "  </publications>")?;
        }

        writeln!(f)?;
        write_dependencies(f, d)?;

        writeln!(f)?;
        writeln!(f, "</ivy-module>")
    }
}

/// Text placed inside an XML comment, where `--` may not appear.
fn comment(text: &str) -> Cow<'_, str> {
    if !text.contains("--") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 1);
    let mut previous = None;
    for c in text.chars() {
        if c == '-' && previous == Some('-') {
            out.push(' ');
        }
        out.push(c);
        previous = Some(c);
    }
    Cow::Owned(out)
}

fn write_info_body(f: &mut fmt::Formatter<'_>, d: &Descriptor) -> fmt::Result {
    if !d.licenses().is_empty() {
        writeln!(f)?;
        for (license, declared) in d.licenses() {
            if let Some(declared) = declared {
                writeln!(f, "    <!-- {} -->", comment(declared))?;
            }
            writeln!(f, "    <license name=\"{}\"", escape(license.name()))?;
            writeln!(f, "             url=\"{}\"/>", escape(license.location()))?;
        }
    }

    if d.home_page().is_some() || d.description().is_some() {
        writeln!(f)?;
        f.write_str("    <description")?;
        if let Some(home_page) = d.home_page() {
            write!(f, " homepage=\"{}\"", escape(home_page))?;
        }
        match d.description() {
            None => writeln!(f, "/>")?,
            Some(description) => {
                writeln!(f, ">")?;
                writeln!(f, "      {}", escape(description))?;
                writeln!(f, "    </description>")?;
            }
        }
    }
    Ok(())
}

fn write_dependencies(f: &mut fmt::Formatter<'_>, d: &Descriptor) -> fmt::Result {
    let required = d.dependencies();
    let optional = d.optional_dependencies();

    if required.is_empty() && optional.is_empty() {
        return writeln!(f, "  <dependencies/>");
    }

    writeln!(f, "  <dependencies>")?;
    for (marker, dependency) in required {
        let requested = dependency.identifier().as_string();
        write!(
            f,
            "    <dependency org=\"{}\" name=\"{}\" rev=\"{}\"/> <!-- maven requested=\"{}",
            escape(marker.organisation()),
            escape(marker.module()),
            escape(&marker.revision().to_string()),
            comment(&requested)
        )?;
        if let Some(source) = marker.source().map(|s| s.as_string())
            && source != requested
        {
            write!(f, "\" mapped=\"{}", comment(&source))?;
        }
        writeln!(f, "\" -->")?;
    }

    if !required.is_empty() && !optional.is_empty() {
        writeln!(f)?;
    }

    for (dependency, marker) in optional {
        let mut line = String::new();
        write!(
            line,
            "    <!-- dependency maven=\"{}",
            comment(&dependency.identifier().as_string())
        )?;
        if let Some(marker) = marker {
            write!(
                line,
                "\" org=\"{}\" name=\"{}\" rev=\"{}",
                comment(marker.organisation()),
                comment(marker.module()),
                comment(&marker.revision().to_string())
            )?;
        }
        write!(line, "\" conf=\"{}", dependency.scope())?;
        if dependency.is_optional() {
            line.push_str(",optional");
        }
        line.push_str("\" -->");
        writeln!(f, "{line}")?;
    }

    writeln!(f, "  </dependencies>")
}
