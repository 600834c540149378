//! PDF Document - main entry point for object access.
//!
//! Handles:
//! - cross-reference loading and recovery
//! - object resolution with a shared cache
//! - decryption of strings and streams
//! - the lazily built page list

use super::page::{PDFPage, collect_pages};
use super::security::{StandardSecurityHandler, create_security_handler};
use super::xref::{XRefEntry, XRefTable, find_startxref, load_chain, rebuild};
use crate::codec::filters::{Decoded, decode_pipeline, filter_chain};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject, PDFStream};
use crate::parser::lexer::PSToken;
use crate::parser::pdf_parser::{PDFParser, memchr_find, parse_indirect_at};
use bytes::Bytes;
use indexmap::IndexMap;
use memmap2::Mmap;
use regex::bytes::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Least-recently-used object cache.
struct ObjectCache {
    capacity: usize,
    map: IndexMap<u32, Arc<PDFObject>>,
}

impl ObjectCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: IndexMap::new(),
        }
    }

    fn get(&mut self, objid: u32) -> Option<Arc<PDFObject>> {
        let index = self.map.get_index_of(&objid)?;
        let value = Arc::clone(self.map.get_index(index)?.1);
        if index + 1 != self.map.len() {
            self.map.move_index(index, self.map.len() - 1);
        }
        Some(value)
    }

    /// Returns the cached value when another thread got there first.
    fn insert(&mut self, objid: u32, obj: Arc<PDFObject>) -> Arc<PDFObject> {
        if self.capacity == 0 {
            return obj;
        }
        if let Some(existing) = self.map.get(&objid) {
            return Arc::clone(existing);
        }
        self.map.insert(objid, Arc::clone(&obj));
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
        obj
    }
}

/// Decoded object stream: body plus `(objid, offset)` pairs from its header.
#[derive(Debug)]
struct ObjStmData {
    body: Vec<u8>,
    first: usize,
    members: Vec<(u32, usize)>,
}

/// PDF Document - provides access to PDF objects and pages.
///
/// Owns its data via `Bytes` (copied, shared or memory-mapped) and is
/// `Send + Sync`; renders on several threads share one instance.
pub struct PDFDocument {
    data: Bytes,
    xref: XRefTable,
    trailer: PDFDict,
    catalog: PDFDict,
    security: Option<StandardSecurityHandler>,
    cache: Mutex<ObjectCache>,
    objstms: RwLock<FxHashMap<u32, Arc<ObjStmData>>>,
    pages: OnceLock<std::result::Result<Vec<Arc<PDFPage>>, String>>,
}

impl std::fmt::Debug for PDFDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PDFDocument")
            .field("len", &self.data.len())
            .field("objects", &self.xref.len())
            .field("rebuilt", &self.xref.rebuilt)
            .field("encrypted", &self.security.is_some())
            .finish_non_exhaustive()
    }
}

thread_local! {
    /// Object ids being resolved on this thread's call stack.
    static RESOLVING: RefCell<FxHashSet<u32>> = RefCell::new(FxHashSet::default());
}

struct ResolvingGuard {
    objid: u32,
}

impl ResolvingGuard {
    fn enter(objid: u32) -> Result<Self> {
        let fresh = RESOLVING.with(|set| set.borrow_mut().insert(objid));
        if fresh {
            Ok(Self { objid })
        } else {
            Err(PdfError::CircularReference(objid))
        }
    }
}

impl Drop for ResolvingGuard {
    fn drop(&mut self) {
        RESOLVING.with(|set| {
            set.borrow_mut().remove(&self.objid);
        });
    }
}

impl PDFDocument {
    /// Create a new PDFDocument from raw PDF data.
    pub fn new(data: impl Into<Bytes>, password: &str) -> Result<Self> {
        Self::with_cache(data, password, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new PDFDocument with an explicit object cache capacity.
    pub fn with_cache(data: impl Into<Bytes>, password: &str, cache_capacity: usize) -> Result<Self> {
        Self::load(data.into(), password, cache_capacity)
    }

    /// Create a new PDFDocument from a memory-mapped file. The mapping lives
    /// exactly as long as the document.
    pub fn from_mmap(mmap: Mmap, password: &str, cache_capacity: usize) -> Result<Self> {
        Self::load(Bytes::from_owner(mmap), password, cache_capacity)
    }

    fn load(data: Bytes, password: &str, cache_capacity: usize) -> Result<Self> {
        let head = &data[..data.len().min(1024)];
        if memchr_find(head, b"%PDF-").is_none() {
            return Err(PdfError::SyntaxError("missing %PDF- header".into()));
        }

        let chain = find_startxref(&data)
            .ok_or(PdfError::NoValidXRef)
            .and_then(|pos| load_chain(&data, pos));
        match chain {
            Ok(table) if !table.is_empty() && table.trailer.contains_key("Root") => {
                match Self::assemble(data.clone(), table, password, cache_capacity) {
                    Ok(doc) => return Ok(doc),
                    Err(err @ PdfError::EncryptionError(_)) => return Err(err),
                    Err(err) => tracing::warn!(%err, "xref chain unusable, rescanning file"),
                }
            }
            Ok(_) => tracing::warn!("xref chain has no /Root, rescanning file"),
            Err(err) => tracing::warn!(%err, "startxref unusable, rescanning file"),
        }
        let table = rebuild(&data)?;
        Self::assemble(data, table, password, cache_capacity)
    }

    fn assemble(data: Bytes, xref: XRefTable, password: &str, cache_capacity: usize) -> Result<Self> {
        let mut doc = Self {
            data,
            trailer: xref.trailer.clone(),
            xref,
            catalog: PDFDict::new(),
            security: None,
            cache: Mutex::new(ObjectCache::new(cache_capacity)),
            objstms: RwLock::new(FxHashMap::default()),
            pages: OnceLock::new(),
        };

        if let Some(encrypt) = doc.trailer.get("Encrypt").cloned() {
            // The encryption dictionary itself is never encrypted.
            let encrypt = doc.resolve(&encrypt)?;
            let ids: Vec<Vec<u8>> = match doc.trailer.get("ID").map(|id| doc.resolve(id)) {
                Some(Ok(id)) => id
                    .as_array()
                    .map(|arr| arr.iter().filter_map(|s| s.as_string().ok().map(<[u8]>::to_vec)).collect())
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            doc.security = create_security_handler(encrypt.as_dict()?, &ids, password)?;
            doc.clear_cache();
        }

        if doc.xref.rebuilt {
            doc.index_object_streams();
        }

        doc.catalog = doc.find_catalog()?;
        Ok(doc)
    }

    /// Registers members of object streams found by a rebuild scan.
    fn index_object_streams(&mut self) {
        let candidates = std::mem::take(&mut self.xref.objstm_candidates);
        let mut added = Vec::new();
        for stream_objid in &candidates {
            match self.objstm(*stream_objid) {
                Ok(stm) => {
                    for (index, (objid, _)) in stm.members.iter().enumerate() {
                        added.push((
                            *objid,
                            XRefEntry::InStream {
                                stream_objid: *stream_objid,
                                index,
                            },
                        ));
                    }
                }
                Err(err) => tracing::debug!(stream_objid, %err, "object stream unreadable"),
            }
        }
        for (objid, entry) in added {
            self.xref.insert_if_absent(objid, entry);
        }
        self.xref.objstm_candidates = candidates;
    }

    fn find_catalog(&self) -> Result<PDFDict> {
        if let Some(root) = self.trailer.get("Root")
            && let Ok(obj) = self.resolve(root)
            && let Ok(dict) = obj.as_dict()
        {
            return Ok(dict.clone());
        }
        if !self.xref.rebuilt {
            return Err(PdfError::SyntaxError("/Root does not resolve to a dictionary".into()));
        }
        for objid in self.xref.catalog_candidates.iter().rev() {
            if let Ok(obj) = self.getobj(*objid)
                && let Ok(dict) = obj.as_dict()
            {
                tracing::debug!(objid, "catalog recovered by scan");
                return Ok(dict.clone());
            }
        }
        // Pages can still be recovered from loose /Type /Page objects.
        tracing::warn!("no document catalog found");
        Ok(PDFDict::new())
    }

    /// Returns the raw PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub const fn catalog(&self) -> &PDFDict {
        &self.catalog
    }

    pub const fn trailer(&self) -> &PDFDict {
        &self.trailer
    }

    pub const fn xref(&self) -> &XRefTable {
        &self.xref
    }

    pub const fn is_encrypted(&self) -> bool {
        self.security.is_some()
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.map.clear();
        }
        if let Ok(mut stms) = self.objstms.write() {
            stms.clear();
        }
    }

    /// Get an object by ID without cloning the cached object.
    pub fn getobj(&self, objid: u32) -> Result<Arc<PDFObject>> {
        if objid == 0 {
            return Err(PdfError::ObjectNotFound(0));
        }
        if let Ok(mut cache) = self.cache.lock()
            && let Some(obj) = cache.get(objid)
        {
            return Ok(obj);
        }
        let _guard = ResolvingGuard::enter(objid)?;

        let entry = self.xref.get(objid).ok_or(PdfError::ObjectNotFound(objid))?;
        let obj = match entry {
            XRefEntry::InFile { offset, genno } => {
                let obj = self.load_in_file(objid, genno, offset)?;
                self.decrypt_object(obj, objid, genno)?
            }
            // Members of object streams were decrypted with their stream.
            XRefEntry::InStream { stream_objid, index } => self.load_in_stream(objid, stream_objid, index)?,
        };

        let obj = Arc::new(obj);
        match self.cache.lock() {
            Ok(mut cache) => Ok(cache.insert(objid, obj)),
            Err(_) => Ok(obj),
        }
    }

    fn stream_length(&self, length: &PDFObject) -> Option<usize> {
        self.resolve(length)
            .ok()
            .and_then(|l| l.as_int().ok())
            .and_then(|n| usize::try_from(n).ok())
    }

    fn load_in_file(&self, objid: u32, genno: u32, offset: usize) -> Result<PDFObject> {
        match parse_indirect_at(&self.data, offset, false, |l| self.stream_length(l)) {
            Ok(ind) if ind.objid == objid => return Ok(ind.obj),
            Ok(ind) => tracing::debug!(objid, found = ind.objid, offset, "xref offset points at another object"),
            Err(err) => tracing::debug!(objid, offset, %err, "object at xref offset unreadable"),
        }
        let offset = self
            .scan_for_object(objid, genno)
            .ok_or(PdfError::ObjectNotFound(objid))?;
        let ind = parse_indirect_at(&self.data, offset, false, |l| self.stream_length(l))?;
        Ok(ind.obj)
    }

    /// Last `objid genno obj` header in the file.
    fn scan_for_object(&self, objid: u32, genno: u32) -> Option<usize> {
        let re = Regex::new(&format!(r"(?-u)(?:^|[^0-9]){objid}\s+{genno}\s+obj\b")).ok()?;
        let m = re.find_iter(&self.data).last()?;
        let start = m.start() + usize::from(!m.as_bytes()[0].is_ascii_digit());
        Some(start)
    }

    fn objstm(&self, stream_objid: u32) -> Result<Arc<ObjStmData>> {
        if let Ok(stms) = self.objstms.read()
            && let Some(stm) = stms.get(&stream_objid)
        {
            return Ok(Arc::clone(stm));
        }
        let obj = self.getobj(stream_objid)?;
        let stream = obj.as_stream()?;
        let body = self.decode_stream(stream)?;
        let n = stream.get("N").and_then(|v| v.as_int().ok()).unwrap_or(0).max(0) as usize;
        let first = stream
            .get("First")
            .and_then(|v| v.as_int().ok())
            .and_then(|f| usize::try_from(f).ok())
            .ok_or_else(|| PdfError::SyntaxError(format!("object stream {stream_objid} has no /First")))?;
        if first > body.len() {
            return Err(PdfError::SyntaxError(format!(
                "object stream {stream_objid}: /First {first} past end of data"
            )));
        }

        let mut header = PDFParser::new(&body[..first]);
        let mut members = Vec::with_capacity(n);
        while members.len() < n {
            let (Ok(Some((_, PSToken::Int(id)))), Ok(Some((_, PSToken::Int(off))))) =
                (header.next_raw(), header.next_raw())
            else {
                break;
            };
            members.push((id.max(0) as u32, off.max(0) as usize));
        }

        let stm = Arc::new(ObjStmData { body, first, members });
        if let Ok(mut stms) = self.objstms.write() {
            stms.insert(stream_objid, Arc::clone(&stm));
        }
        Ok(stm)
    }

    fn load_in_stream(&self, objid: u32, stream_objid: u32, index: usize) -> Result<PDFObject> {
        let stm = self.objstm(stream_objid)?;
        // Prefer the header's own id; the xref index can be stale.
        let (_, offset) = stm
            .members
            .iter()
            .find(|(id, _)| *id == objid)
            .or_else(|| stm.members.get(index))
            .copied()
            .ok_or(PdfError::ObjectNotFound(objid))?;
        let at = stm.first + offset;
        if at >= stm.body.len() {
            return Err(PdfError::ObjectNotFound(objid));
        }
        PDFParser::at(&stm.body, at).parse_object()
    }

    fn decrypt_object(&self, obj: PDFObject, objid: u32, genno: u32) -> Result<PDFObject> {
        let Some(handler) = &self.security else {
            return Ok(obj);
        };
        Ok(match obj {
            PDFObject::String(data) => PDFObject::String(handler.decrypt_string(objid, genno, &data)?),
            PDFObject::Array(arr) => PDFObject::Array(
                arr.into_iter()
                    .map(|item| self.decrypt_object(item, objid, genno))
                    .collect::<Result<_>>()?,
            ),
            PDFObject::Dict(dict) => PDFObject::Dict(self.decrypt_dict(dict, objid, genno)?),
            PDFObject::Stream(mut stream) => {
                stream.attrs = self.decrypt_dict(std::mem::take(&mut stream.attrs), objid, genno)?;
                if !stream.rawdata_is_decrypted() {
                    let plain = handler.decrypt_stream(objid, genno, stream.get_rawdata(), &stream.attrs)?;
                    stream.set_rawdata_decrypted(plain);
                }
                PDFObject::Stream(stream)
            }
            other => other,
        })
    }

    fn decrypt_dict(&self, dict: PDFDict, objid: u32, genno: u32) -> Result<PDFDict> {
        dict.into_iter()
            .map(|(k, v)| Ok((k, self.decrypt_object(v, objid, genno)?)))
            .collect()
    }

    /// Resolve a reference (or a chain of them) to its object.
    pub fn resolve(&self, obj: &PDFObject) -> Result<Arc<PDFObject>> {
        let PDFObject::Ref(r) = obj else {
            return Ok(Arc::new(obj.clone()));
        };
        let mut seen = FxHashSet::default();
        seen.insert(r.objid);
        let mut current = self.getobj(r.objid)?;
        while let PDFObject::Ref(next) = current.as_ref() {
            if !seen.insert(next.objid) {
                return Err(PdfError::CircularReference(next.objid));
            }
            current = self.getobj(next.objid)?;
        }
        Ok(current)
    }

    /// Dictionary value with references resolved; missing or broken entries
    /// are `None`.
    pub fn get_resolved(&self, dict: &PDFDict, key: &str) -> Option<Arc<PDFObject>> {
        let value = dict.get(key)?;
        match self.resolve(value) {
            Ok(obj) if !obj.is_null() => Some(obj),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(key, %err, "unresolvable dictionary entry");
                None
            }
        }
    }

    /// `/Filter` and `/DecodeParms` with indirect parts resolved.
    fn resolved_filter_entry(&self, stream: &PDFStream, key: &str) -> Option<PDFObject> {
        let value = self.resolve(stream.get(key)?).ok()?;
        Some(match value.as_ref() {
            PDFObject::Array(items) => PDFObject::Array(
                items
                    .iter()
                    .map(|item| self.resolve(item).map_or(PDFObject::Null, |o| (*o).clone()))
                    .collect(),
            ),
            other => other.clone(),
        })
    }

    /// Run the filter pipeline; stops at image codecs.
    pub fn decode_stream_full(&self, stream: &PDFStream) -> Result<Decoded> {
        let filter = self.resolved_filter_entry(stream, "Filter");
        let parms = self
            .resolved_filter_entry(stream, "DecodeParms")
            .or_else(|| self.resolved_filter_entry(stream, "DP"));
        let chain = filter_chain(filter.as_ref(), parms.as_ref());
        decode_pipeline(stream.get_rawdata().to_vec(), &chain)
    }

    /// Decoded stream bytes. Streams ending in an image codec are only
    /// readable through `decode_stream_full`.
    pub fn decode_stream(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        let decoded = self.decode_stream_full(stream)?;
        match decoded.image_filter {
            Some((filter, _)) => Err(PdfError::UnsupportedFilter(format!("{filter:?} outside an image"))),
            None => Ok(decoded.data),
        }
    }

    /// Every page, walking the page tree on first use.
    pub fn pages(&self) -> Result<&[Arc<PDFPage>]> {
        self.pages
            .get_or_init(|| collect_pages(self).map_err(|e| e.to_string()))
            .as_deref()
            .map_err(|msg| PdfError::MalformedDocument(msg.clone()))
    }

    /// Number of pages; a malformed page tree counts as zero.
    pub fn page_count(&self) -> usize {
        self.pages().map_or(0, <[Arc<PDFPage>]>::len)
    }

    pub fn page(&self, index: usize) -> Result<Arc<PDFPage>> {
        let pages = self.pages()?;
        pages
            .get(index)
            .cloned()
            .ok_or(PdfError::InvalidPageIndex {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                page_count: pages.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn document_is_send_sync() {
        assert_send_sync::<PDFDocument>();
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(PDFDocument::new(b"hello world".to_vec(), "").is_err());
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = ObjectCache::new(2);
        cache.insert(1, Arc::new(PDFObject::Int(1)));
        cache.insert(2, Arc::new(PDFObject::Int(2)));
        assert!(cache.get(1).is_some());
        cache.insert(3, Arc::new(PDFObject::Int(3)));
        assert!(cache.get(2).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_some());

        let first = cache.insert(1, Arc::new(PDFObject::Int(10)));
        assert_eq!(*first, PDFObject::Int(1));
        assert!(ObjectCache::new(0).insert(5, Arc::new(PDFObject::Null)).is_null());
    }

    #[test]
    fn guard_detects_reentry() {
        let outer = ResolvingGuard::enter(99).unwrap();
        assert!(matches!(
            ResolvingGuard::enter(99),
            Err(PdfError::CircularReference(99))
        ));
        drop(outer);
        assert!(ResolvingGuard::enter(99).is_ok());
    }
}
