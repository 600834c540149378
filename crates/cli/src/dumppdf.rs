//! dumppdf - Dump PDF structure in XML format
//!
//! A command line tool for inspecting what the renderer sees: the trailer,
//! every object in the cross-reference map, page boxes and rotation, or a
//! single object.

use anyhow::Context;
use clap::{ArgAction, Parser};
use pdfthumb_core::document::XRefEntry;
use pdfthumb_core::model::objects::PDFObject;
use pdfthumb_core::{OpenOptions, PDFDocument};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Escape special characters for XML output.
fn escape(s: &[u8]) -> String {
    let mut result = String::new();
    for &byte in s {
        match byte {
            b'&' => result.push_str("&amp;"),
            b'<' => result.push_str("&lt;"),
            b'>' => result.push_str("&gt;"),
            b'"' => result.push_str("&quot;"),
            b'\'' => result.push_str("&#39;"),
            0..=31 | 127..=255 => {
                result.push_str(&format!("&#{byte};"));
            }
            _ => result.push(byte as char),
        }
    }
    result
}

/// Dump a PDF object as XML. Stream data is decoded and included when
/// `with_data` is set.
fn dumpxml<W: Write>(out: &mut W, doc: &PDFDocument, obj: &PDFObject, with_data: bool) -> io::Result<()> {
    match obj {
        PDFObject::Null => write!(out, "<null />"),
        PDFObject::Bool(b) => write!(out, "<boolean>{b}</boolean>"),
        PDFObject::Int(n) => write!(out, "<number>{n}</number>"),
        PDFObject::Real(n) => write!(out, "<number>{n}</number>"),
        PDFObject::String(s) => write!(out, r#"<string size="{}">{}</string>"#, s.len(), escape(s)),
        PDFObject::Name(name) => write!(out, "<literal>{}</literal>", escape(name.as_bytes())),
        PDFObject::Array(arr) => {
            writeln!(out, r#"<list size="{}">"#, arr.len())?;
            for item in arr {
                dumpxml(out, doc, item, with_data)?;
                writeln!(out)?;
            }
            write!(out, "</list>")
        }
        PDFObject::Dict(dict) => {
            writeln!(out, r#"<dict size="{}">"#, dict.len())?;
            let mut keys: Vec<&String> = dict.keys().collect();
            keys.sort();
            for k in keys {
                writeln!(out, "<key>{}</key>", escape(k.as_bytes()))?;
                write!(out, "<value>")?;
                dumpxml(out, doc, &dict[k], with_data)?;
                writeln!(out, "</value>")?;
            }
            write!(out, "</dict>")
        }
        PDFObject::Stream(stream) => {
            writeln!(out, "<stream>")?;
            writeln!(out, "<props>")?;
            dumpxml(out, doc, &PDFObject::Dict(stream.attrs.clone()), with_data)?;
            writeln!(out)?;
            writeln!(out, "</props>")?;
            if with_data {
                match doc.decode_stream(stream) {
                    Ok(data) => writeln!(out, r#"<data size="{}">{}</data>"#, data.len(), escape(&data))?,
                    Err(err) => writeln!(out, r#"<data error="{}" />"#, escape(err.to_string().as_bytes()))?,
                }
            }
            write!(out, "</stream>")
        }
        PDFObject::Ref(objref) => write!(out, r#"<ref id="{}" />"#, objref.objid),
    }
}

fn dumptrailer<W: Write>(out: &mut W, doc: &PDFDocument) -> io::Result<()> {
    writeln!(out, "<trailer>")?;
    dumpxml(out, doc, &PDFObject::Dict(doc.trailer().clone()), false)?;
    writeln!(out)?;
    writeln!(out, "</trailer>")?;
    if doc.xref().rebuilt {
        writeln!(out, "<!-- cross-reference table rebuilt by scanning the file -->")?;
    }
    Ok(())
}

/// Dump every object of the cross-reference map in id order.
fn dumpallobjs<W: Write>(out: &mut W, doc: &PDFDocument, with_data: bool) -> io::Result<()> {
    writeln!(out, "<pdf>")?;
    let mut objids = doc.xref().objids();
    objids.sort_unstable();
    for objid in objids {
        let location = match doc.xref().get(objid) {
            Some(XRefEntry::InFile { offset, genno }) => format!(r#"offset="{offset}" gen="{genno}""#),
            Some(XRefEntry::InStream { stream_objid, index }) => {
                format!(r#"stream="{stream_objid}" index="{index}""#)
            }
            None => String::new(),
        };
        match doc.getobj(objid) {
            Ok(obj) => {
                writeln!(out, r#"<object id="{objid}" {location}>"#)?;
                dumpxml(out, doc, &obj, with_data)?;
                writeln!(out)?;
                writeln!(out, "</object>")?;
            }
            Err(err) => {
                tracing::warn!(objid, %err, "object unreadable");
            }
        }
    }
    dumptrailer(out, doc)?;
    writeln!(out, "</pdf>")
}

/// Dump page boxes, rotation and content stream count.
fn dumppages<W: Write>(out: &mut W, doc: &PDFDocument) -> io::Result<()> {
    let pages = match doc.pages() {
        Ok(pages) => pages,
        Err(err) => {
            writeln!(out, r#"<pages error="{}" />"#, escape(err.to_string().as_bytes()))?;
            return Ok(());
        }
    };
    writeln!(out, r#"<pages count="{}">"#, pages.len())?;
    for (index, page) in pages.iter().enumerate() {
        let (x0, y0, x1, y1) = page.mediabox;
        write!(
            out,
            r#"<page index="{index}" id="{}" mediabox="{x0} {y0} {x1} {y1}" rotate="{}""#,
            page.pageid, page.rotate
        )?;
        if let Some((cx0, cy0, cx1, cy1)) = page.cropbox {
            write!(out, r#" cropbox="{cx0} {cy0} {cx1} {cy1}""#)?;
        }
        writeln!(out, r#" contents="{}" />"#, page.contents.len())?;
    }
    writeln!(out, "</pages>")
}

/// A command line tool for dumping PDF internal structure as XML.
#[derive(Parser, Debug)]
#[command(name = "dumppdf")]
#[command(author, version, about = "Dump PDF structure in XML format", long_about = None)]
struct Args {
    /// Path to the PDF file
    file: PathBuf,

    /// Print the trailer dictionary (the default when nothing else is asked)
    #[arg(long, action = ArgAction::SetTrue)]
    trailer: bool,

    /// Print every object in the cross-reference map
    #[arg(short = 'a', long, action = ArgAction::SetTrue)]
    objects: bool,

    /// Print page boxes and rotation
    #[arg(long, action = ArgAction::SetTrue)]
    pages: bool,

    /// Print one object by id (repeatable)
    #[arg(short = 'i', long = "object")]
    object: Vec<u32>,

    /// Include decoded stream data
    #[arg(short = 't', long = "text-stream", action = ArgAction::SetTrue)]
    text_stream: bool,

    /// The password to use for decrypting PDF file
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();

    if !args.file.exists() {
        anyhow::bail!("File not found: {}", args.file.display());
    }
    let options = OpenOptions::new().password(&args.password);
    let doc = pdfthumb_core::open_path_with_options(&args.file, &options)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let mut out = BufWriter::new(io::stdout());
    for &objid in &args.object {
        let obj = doc.getobj(objid).with_context(|| format!("object {objid}"))?;
        dumpxml(&mut out, &doc, &obj, args.text_stream)?;
        writeln!(out)?;
    }
    if args.objects {
        dumpallobjs(&mut out, &doc, args.text_stream)?;
    }
    if args.pages {
        dumppages(&mut out, &doc)?;
    }
    if args.trailer || (args.object.is_empty() && !args.objects && !args.pages) {
        dumptrailer(&mut out, &doc)?;
    }
    out.flush()?;
    Ok(())
}
