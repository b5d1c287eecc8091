//! Incremental PDF writer.
//!
//! Page content, images and font programs are written out as soon as they
//! are produced so a chunk never holds more than its current page in memory.
//! Only the page tree, catalog and shared resources wait for `finish`.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Object, ObjectId, StringFormat, dictionary};
use std::collections::BTreeMap;
use std::io::{self, Seek, Write};

/// Zlib-compresses a stream body for `/FlateDecode`.
pub fn flate_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

pub struct StreamingPdfWriter<W: Write + Seek> {
    writer: W,
    offsets: BTreeMap<u32, u64>,
    max_id: u32,
    pub catalog_id: ObjectId,
    pub pages_id: ObjectId,
    pub resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl<W: Write + Seek> StreamingPdfWriter<W> {
    pub fn new(mut writer: W, version: &str) -> io::Result<Self> {
        writer.write_all(format!("%PDF-{}\n%\u{e2}\u{e3}\u{cf}\u{d3}\n", version).as_bytes())?;
        Ok(Self {
            writer,
            offsets: BTreeMap::new(),
            max_id: 3,
            resources_id: (1, 0),
            pages_id: (2, 0),
            catalog_id: (3, 0),
            page_ids: Vec::new(),
        })
    }

    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    /// Allocates an id and writes the object immediately.
    pub fn write_object(&mut self, object: &Object) -> io::Result<ObjectId> {
        let id = self.new_object_id();
        self.write_object_at_id(id, object)?;
        Ok(id)
    }

    pub fn write_object_at_id(&mut self, id: ObjectId, object: &Object) -> io::Result<()> {
        if id.0 > self.max_id {
            self.max_id = id.0;
        }
        let offset = self.writer.stream_position()?;
        self.offsets.insert(id.0, offset);
        write!(self.writer, "{} {} obj\n", id.0, id.1)?;
        internal_writer::write_object(&mut self.writer, object)?;
        self.writer.write_all(b"\nendobj\n")
    }

    pub fn add_page(&mut self, page_id: ObjectId) {
        self.page_ids.push(page_id);
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Writes the shared resources, page tree, catalog, xref and trailer.
    pub fn finish(mut self, resources: Dictionary) -> io::Result<W> {
        self.write_object_at_id(self.resources_id, &Object::Dictionary(resources))?;

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.write_object_at_id(self.pages_id, &Object::Dictionary(pages_dict))?;

        let catalog = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        self.write_object_at_id(self.catalog_id, &Object::Dictionary(catalog))?;

        let xref_start = self.writer.stream_position()?;
        let size = self.max_id + 1;
        writeln!(self.writer, "xref")?;
        writeln!(self.writer, "0 {}", size)?;
        writeln!(self.writer, "0000000000 65535 f ")?;
        for id in 1..size {
            match self.offsets.get(&id) {
                Some(offset) => writeln!(self.writer, "{:010} 00000 n ", offset)?,
                None => writeln!(self.writer, "0000000000 65535 f ")?,
            }
        }

        let trailer = dictionary! { "Size" => size as i64, "Root" => self.catalog_id };
        writeln!(self.writer, "trailer")?;
        internal_writer::write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{}", xref_start)?;
        write!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

mod internal_writer {
    use super::*;

    fn write_real(writer: &mut dyn Write, r: f32) -> io::Result<()> {
        if !r.is_finite() {
            return writer.write_all(b"0");
        }
        let text = format!("{:.4}", r);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        match text {
            "-0" | "" => writer.write_all(b"0"),
            t => writer.write_all(t.as_bytes()),
        }
    }

    pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
        match object {
            Object::Null => writer.write_all(b"null"),
            Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(writer, "{}", i),
            Object::Real(r) => write_real(writer, *r),
            Object::Name(n) => {
                writer.write_all(b"/")?;
                for &byte in n {
                    if byte.is_ascii_graphic() && !b"#/()<>[]{}%".contains(&byte) {
                        writer.write_all(&[byte])?;
                    } else {
                        write!(writer, "#{:02X}", byte)?;
                    }
                }
                Ok(())
            }
            Object::String(s, StringFormat::Literal) => {
                writer.write_all(b"(")?;
                for &byte in s {
                    match byte {
                        b'(' | b')' | b'\\' => writer.write_all(&[b'\\', byte])?,
                        b'\r' => writer.write_all(b"\\r")?,
                        _ => writer.write_all(&[byte])?,
                    }
                }
                writer.write_all(b")")
            }
            Object::String(s, StringFormat::Hexadecimal) => {
                writer.write_all(b"<")?;
                for byte in s {
                    write!(writer, "{:02X}", byte)?;
                }
                writer.write_all(b">")
            }
            Object::Array(arr) => {
                writer.write_all(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        writer.write_all(b" ")?;
                    }
                    write_object(writer, obj)?;
                }
                writer.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(writer, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(writer, &dict)?;
                writer.write_all(b"\nstream\n")?;
                writer.write_all(&stream.content)?;
                writer.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
        }
    }

    pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
        writer.write_all(b"<<")?;
        for (key, value) in dict.iter() {
            write_object(writer, &Object::Name(key.clone()))?;
            writer.write_all(b" ")?;
            write_object(writer, value)?;
            writer.write_all(b" ")?;
        }
        writer.write_all(b">>")
    }
}
