//! PDF Page - a leaf of the page tree with its inherited attributes.

use super::catalog::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::{Rect, normalize_rect};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// US Letter, used when no MediaBox is found anywhere up the tree.
pub const DEFAULT_MEDIABOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// Deepest page tree accepted before the tree is called malformed.
const MAX_TREE_DEPTH: usize = 256;

/// A PDF page object.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// Page object ID (0 for pages given inline in `/Kids`)
    pub pageid: u32,
    /// Page dictionary with inherited attributes filled in
    pub attrs: PDFDict,
    /// Media box, normalized so x0 <= x1 and y0 <= y1
    pub mediabox: Rect,
    /// Crop box clipped to the media box
    pub cropbox: Option<Rect>,
    /// Rotation in degrees, one of 0, 90, 180, 270
    pub rotate: i64,
    pub resources: PDFDict,
    /// Content streams (or references to them) in drawing order
    pub contents: Vec<PDFObject>,
}

impl PDFPage {
    fn from_attrs(pageid: u32, attrs: PDFDict, doc: &PDFDocument) -> Self {
        let mediabox = parse_box(&attrs, "MediaBox", doc).unwrap_or_else(|| {
            tracing::debug!(pageid, "page has no usable MediaBox, using US Letter");
            DEFAULT_MEDIABOX
        });
        let cropbox = parse_box(&attrs, "CropBox", doc).and_then(|cb| intersect(cb, mediabox));
        let rotate = doc
            .get_resolved(&attrs, "Rotate")
            .and_then(|r| r.as_num().ok())
            .map_or(0, normalize_rotation);
        let resources = doc
            .get_resolved(&attrs, "Resources")
            .and_then(|r| r.as_dict().ok().cloned())
            .unwrap_or_default();
        let contents = match attrs.get("Contents") {
            None => Vec::new(),
            Some(obj) => match doc.resolve(obj) {
                Ok(resolved) => match resolved.as_ref() {
                    PDFObject::Array(items) => items.clone(),
                    PDFObject::Stream(_) => vec![obj.clone()],
                    _ => Vec::new(),
                },
                Err(err) => {
                    tracing::debug!(pageid, %err, "page contents unresolvable");
                    Vec::new()
                }
            },
        };
        Self {
            pageid,
            attrs,
            mediabox,
            cropbox,
            rotate,
            resources,
            contents,
        }
    }

    /// The box the page is rendered from.
    pub fn page_box(&self, use_crop_box: bool) -> Rect {
        if use_crop_box {
            self.cropbox.unwrap_or(self.mediabox)
        } else {
            self.mediabox
        }
    }

    /// Decoded content streams in order. Null entries are skipped; a stream
    /// that does not decode fails the page.
    pub fn content_streams(&self, doc: &PDFDocument) -> Result<Vec<Vec<u8>>> {
        let mut streams = Vec::with_capacity(self.contents.len());
        for item in &self.contents {
            // A reference to a missing object reads as null.
            let obj = match doc.resolve(item) {
                Err(PdfError::ObjectNotFound(_)) => continue,
                other => other?,
            };
            if obj.is_null() {
                continue;
            }
            let data = doc.decode_stream(obj.as_stream()?).inspect_err(|err| {
                tracing::debug!(pageid = self.pageid, %err, "content stream undecodable");
            })?;
            streams.push(data);
        }
        Ok(streams)
    }
}

/// Maps any angle onto 0, 90, 180 or 270.
pub fn normalize_rotation(degrees: f64) -> i64 {
    let quarter = (degrees / 90.0).round() as i64;
    (quarter.rem_euclid(4)) * 90
}

fn parse_box(attrs: &PDFDict, key: &str, doc: &PDFDocument) -> Option<Rect> {
    let obj = doc.get_resolved(attrs, key)?;
    let arr = obj.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut v = [0.0; 4];
    for (slot, item) in v.iter_mut().zip(arr) {
        *slot = doc.resolve(item).ok()?.as_num().ok()?;
    }
    let r = normalize_rect((v[0], v[1], v[2], v[3]));
    (r.2 > r.0 && r.3 > r.1).then_some(r)
}

fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let r = (a.0.max(b.0), a.1.max(b.1), a.2.min(b.2), a.3.min(b.3));
    (r.2 > r.0 && r.3 > r.1).then_some(r)
}

/// Inheritable attributes along the current path, innermost first.
#[derive(Debug)]
struct InheritedNode {
    parent: Option<Arc<InheritedNode>>,
    values: Vec<(&'static str, PDFObject)>,
}

const INHERITABLE: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

impl InheritedNode {
    fn from_dict(parent: Option<Arc<Self>>, dict: &PDFDict) -> Arc<Self> {
        let values = INHERITABLE
            .iter()
            .filter_map(|key| dict.get(*key).map(|v| (*key, v.clone())))
            .collect();
        Arc::new(Self { parent, values })
    }

    fn lookup(&self, key: &str) -> Option<&PDFObject> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(key)))
    }

    fn apply_to(&self, dest: &mut PDFDict) {
        for key in INHERITABLE {
            if !dest.contains_key(key)
                && let Some(val) = self.lookup(key)
            {
                dest.insert(key.to_string(), val.clone());
            }
        }
    }
}

struct TreeWalk<'a> {
    doc: &'a PDFDocument,
    /// Ids on the current root-to-leaf path.
    path: FxHashSet<u32>,
    pages: Vec<Arc<PDFPage>>,
}

impl TreeWalk<'_> {
    fn visit(&mut self, node: &PDFObject, inherited: &Arc<InheritedNode>, depth: usize) -> Result<()> {
        if depth > MAX_TREE_DEPTH {
            return Err(PdfError::MalformedDocument(format!(
                "page tree deeper than {MAX_TREE_DEPTH} levels"
            )));
        }
        let objid = match node {
            PDFObject::Ref(r) => Some(r.objid),
            _ => None,
        };
        if let Some(id) = objid
            && !self.path.insert(id)
        {
            return Err(PdfError::MalformedDocument(format!(
                "page tree cycle through object {id}"
            )));
        }

        let result = self.visit_resolved(node, objid.unwrap_or(0), inherited, depth);
        if let Some(id) = objid {
            self.path.remove(&id);
        }
        result
    }

    fn visit_resolved(
        &mut self,
        node: &PDFObject,
        objid: u32,
        inherited: &Arc<InheritedNode>,
        depth: usize,
    ) -> Result<()> {
        let obj = match self.doc.resolve(node) {
            Ok(obj) => obj,
            Err(PdfError::CircularReference(id)) => {
                return Err(PdfError::MalformedDocument(format!(
                    "page tree reference loop at object {id}"
                )));
            }
            Err(err) => {
                tracing::warn!(objid, %err, "page tree node unreadable, skipped");
                return Ok(());
            }
        };
        let Ok(dict) = obj.as_dict() else {
            tracing::debug!(objid, "page tree node is not a dictionary");
            return Ok(());
        };

        let kids = dict.get("Kids");
        let is_pages = match dict.get("Type") {
            Some(PDFObject::Name(t)) if t == "Pages" => true,
            Some(PDFObject::Name(t)) if t == "Page" => false,
            _ => kids.is_some(),
        };

        if is_pages {
            let node_inherited = InheritedNode::from_dict(Some(Arc::clone(inherited)), dict);
            let Some(kids) = kids else {
                return Ok(());
            };
            let kids = match self.doc.resolve(kids) {
                Ok(k) => k,
                Err(err) => {
                    tracing::warn!(objid, %err, "/Kids unreadable");
                    return Ok(());
                }
            };
            if let Ok(items) = kids.as_array() {
                for kid in items {
                    self.visit(kid, &node_inherited, depth + 1)?;
                }
            }
        } else {
            let mut attrs = dict.clone();
            inherited.apply_to(&mut attrs);
            self.pages.push(Arc::new(PDFPage::from_attrs(objid, attrs, self.doc)));
        }
        Ok(())
    }
}

/// Walks `/Root /Pages`; falls back to scanning for page objects when the
/// catalog has no usable tree.
pub(crate) fn collect_pages(doc: &PDFDocument) -> Result<Vec<Arc<PDFPage>>> {
    let mut walk = TreeWalk {
        doc,
        path: FxHashSet::default(),
        pages: Vec::new(),
    };
    if let Some(root) = doc.catalog().get("Pages") {
        let top = InheritedNode::from_dict(None, &PDFDict::new());
        walk.visit(root, &top, 0)?;
    }
    if walk.pages.is_empty() {
        walk.pages = collect_by_scan(doc);
        if !walk.pages.is_empty() {
            tracing::debug!(count = walk.pages.len(), "pages recovered by object scan");
        }
    }
    Ok(walk.pages)
}

fn collect_by_scan(doc: &PDFDocument) -> Vec<Arc<PDFPage>> {
    doc.xref()
        .objids()
        .into_iter()
        .filter_map(|objid| {
            let obj = doc.getobj(objid).ok()?;
            let dict = obj.as_dict().ok()?;
            if !matches!(dict.get("Type"), Some(PDFObject::Name(t)) if t == "Page") {
                return None;
            }
            // Pull inheritable values from the parent chain when it exists.
            let mut attrs = dict.clone();
            let mut parent = dict.get("Parent").cloned();
            let mut seen = FxHashSet::default();
            while let Some(PDFObject::Ref(r)) = parent {
                if !seen.insert(r.objid) {
                    break;
                }
                let Ok(p) = doc.getobj(r.objid) else { break };
                let Ok(pd) = p.as_dict() else { break };
                for key in INHERITABLE {
                    if !attrs.contains_key(key)
                        && let Some(v) = pd.get(key)
                    {
                        attrs.insert(key.to_string(), v.clone());
                    }
                }
                parent = pd.get("Parent").cloned();
            }
            Some(Arc::new(PDFPage::from_attrs(objid, attrs, doc)))
        })
        .collect()
}
