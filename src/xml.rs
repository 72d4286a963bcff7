//! The DFXML emitter (§6 "XML emitter" collaborator).
//!
//! A narrow trait plus one concrete, dependency-free writer: push/pop
//! element, `xmlout`, `xmlprintf`-equivalent formatted output, and
//! `xmlescape`. The core (component K) calls this only while holding the
//! output coordinator's lock (§6), so the emitter itself does no locking.

use std::io::{self, Write};

/// Escapes `&`, `<`, `>`, `"` for XML text/attribute content.
pub fn xmlescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub trait XmlEmitter {
    fn push(&mut self, tag: &str) -> io::Result<()>;
    fn pop(&mut self) -> io::Result<()>;
    fn xmlout(&mut self, tag: &str, value: &str) -> io::Result<()>;
    fn xmlout_attrs(&mut self, tag: &str, attrs: &[(&str, &str)], value: &str) -> io::Result<()>;
}

/// Minimal indenting writer over any `io::Write`.
pub struct SimpleXmlWriter<W: Write> {
    out: W,
    stack: Vec<String>,
}

impl<W: Write> SimpleXmlWriter<W> {
    pub fn new(out: W) -> Self {
        SimpleXmlWriter { out, stack: Vec::new() }
    }

    pub fn write_header(&mut self, command_line: &str) -> io::Result<()> {
        writeln!(self.out, "<?xml version='1.0' encoding='UTF-8'?>")?;
        writeln!(
            self.out,
            "<dfxml xmloutputversion='1.0'><creator><program>hashdeep-rs</program></creator><command_line>{}</command_line>",
            xmlescape(command_line)
        )
    }

    pub fn write_footer(&mut self) -> io::Result<()> {
        while !self.stack.is_empty() {
            self.pop()?;
        }
        writeln!(self.out, "</dfxml>")
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.stack.len() {
            write!(self.out, "  ")?;
        }
        Ok(())
    }
}

impl<W: Write> XmlEmitter for SimpleXmlWriter<W> {
    fn push(&mut self, tag: &str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>")?;
        self.stack.push(tag.to_string());
        Ok(())
    }

    fn pop(&mut self) -> io::Result<()> {
        if let Some(tag) = self.stack.pop() {
            self.indent()?;
            writeln!(self.out, "</{tag}>")?;
        }
        Ok(())
    }

    fn xmlout(&mut self, tag: &str, value: &str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>{}</{tag}>", xmlescape(value))
    }

    fn xmlout_attrs(&mut self, tag: &str, attrs: &[(&str, &str)], value: &str) -> io::Result<()> {
        self.indent()?;
        write!(self.out, "<{tag}")?;
        for (k, v) in attrs {
            write!(self.out, " {k}=\"{}\"", xmlescape(v))?;
        }
        writeln!(self.out, ">{}</{tag}>", xmlescape(value))
    }
}

/// Writes one `<fileobject>` element for a hashed file (§6's DFXML shape).
pub fn write_fileobject<W: Write>(
    xml: &mut SimpleXmlWriter<W>,
    filename: &str,
    filesize: u64,
    mtime: Option<&str>,
    hashes: &[(&str, &str)],
) -> io::Result<()> {
    xml.push("fileobject")?;
    xml.xmlout("filename", filename)?;
    xml.xmlout("filesize", &filesize.to_string())?;
    if let Some(mtime) = mtime {
        xml.xmlout("mtime", mtime)?;
    }
    for (alg, hex) in hashes {
        xml.xmlout_attrs("hashdigest", &[("type", alg)], hex)?;
    }
    xml.pop()
}
