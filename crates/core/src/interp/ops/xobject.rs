//! XObject, inline image and shading operators.
//!
//! Handles: Do, BI/ID/EI, sh
//!
//! XObjects:
//! - Do: Invoke named XObject (Form or Image)
//!
//! Inline images:
//! - BI ... ID ... EI arrives from the content parser as one item
//!
//! Shadings:
//! - sh: Paint a shading over the current clip

use std::collections::HashMap;

use crate::error::Result;
use crate::interp::device::PDFDevice;
use crate::interp::image::{decode_image, inline_image_stream};
use crate::interp::interpreter::PDFPageInterpreter;
use crate::model::objects::PDFStream;
use crate::model::shading::Shading;
use crate::parser::PSToken;
use crate::raster::path::rect_path;
use crate::utils::{MATRIX_IDENTITY, mult_matrix};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// Invokes a named XObject: forms run nested, images are drawn on the
    /// unit square.
    ///
    /// PDF operator: `Do`
    pub fn do_Do(&mut self, xobjid: &str) -> Result<()> {
        let Some((objid, obj)) = self.resource("XObject", xobjid) else {
            tracing::debug!(xobject = xobjid, "XObject not found");
            return Ok(());
        };
        let Ok(stream) = obj.as_stream() else {
            tracing::debug!(xobject = xobjid, "XObject is not a stream");
            return Ok(());
        };
        if obj.is_name_at("Subtype", "Form") {
            self.render_form(objid, stream)
        } else if obj.is_name_at("Subtype", "Image") {
            self.render_image(stream)
        } else {
            tracing::debug!(xobject = xobjid, "unsupported XObject subtype");
            Ok(())
        }
    }

    fn render_form(&mut self, objid: Option<u32>, stream: &PDFStream) -> Result<()> {
        let doc = self.doc;
        let numbers = |key: &str| stream.get(key).and_then(|v| doc.resolve(v).ok()).and_then(|v| v.as_numbers().ok());
        let matrix = numbers("Matrix")
            .and_then(|m| <[f64; 6]>::try_from(m).ok())
            .map_or(MATRIX_IDENTITY, |[a, b, c, d, e, f]| (a, b, c, d, e, f));
        let clip = numbers("BBox")
            .and_then(|b| <[f64; 4]>::try_from(b).ok())
            .map(|[x0, y0, x1, y1]| rect_path(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()));
        let resources = stream
            .get("Resources")
            .and_then(|r| doc.resolve(r).ok())
            .and_then(|r| r.as_dict().ok().cloned());
        let data = doc.decode_stream(stream)?;
        let ctm = mult_matrix(matrix, self.gstate.ctm);
        self.run_nested(objid, resources, ctm, clip.as_deref(), &data)
    }

    /// Decodes and draws an image.
    fn render_image(&mut self, stream: &PDFStream) -> Result<()> {
        let fill = self.gstate.fill_rgb();
        let image = decode_image(self.doc, stream, Some(&self.resources), fill)?;
        self.device.draw_image(&self.gstate, &image);
        Ok(())
    }

    /// Draws an inline image.
    pub fn do_inline_image(&mut self, dict: &HashMap<String, PSToken>, data: Vec<u8>) -> Result<()> {
        let stream = inline_image_stream(dict, data);
        self.render_image(&stream)
    }

    /// Paints a shading resource over the current clip.
    ///
    /// PDF operator: `sh`
    pub fn do_sh(&mut self, name: &str) -> Result<()> {
        let Some((_, obj)) = self.resource("Shading", name) else {
            tracing::debug!(shading = name, "shading not found");
            return Ok(());
        };
        match Shading::parse(self.doc, &obj, Some(&self.resources))? {
            Some(shading) => {
                let matrix = self.gstate.ctm;
                self.device.fill_shading(&self.gstate, &shading, matrix, None);
            }
            None => tracing::debug!(shading = name, "unsupported shading type"),
        }
        Ok(())
    }
}
