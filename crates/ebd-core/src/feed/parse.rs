//! Streaming RSS `<item>` reader and description field parsing.

use crate::error::EntryError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
enum Field {
    Link,
    Description,
}

/// Raw text of one `<item>`, before validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RawItem {
    pub link: Option<String>,
    pub description: Option<String>,
}

impl RawItem {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

/// Yields `<item>` elements one at a time from an owned feed document.
pub(crate) struct ItemReader {
    reader: Reader<Cursor<Vec<u8>>>,
    buf: Vec<u8>,
}

impl ItemReader {
    pub(crate) fn new(document: Vec<u8>) -> Self {
        let mut reader = Reader::from_reader(Cursor::new(document));
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Next complete `<item>`, `Ok(None)` at end of document.
    pub(crate) fn next_item(&mut self) -> Result<Option<RawItem>, quick_xml::Error> {
        let mut item: Option<RawItem> = None;
        let mut field: Option<Field> = None;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"item" => {
                        item = Some(RawItem::default());
                        field = None;
                    }
                    b"link" if item.is_some() => field = Some(Field::Link),
                    b"description" if item.is_some() => field = Some(Field::Description),
                    _ => {}
                },
                Event::Text(e) => {
                    if let (Some(item), Some(field)) = (item.as_mut(), field) {
                        item.push(field, &e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let (Some(item), Some(field)) = (item.as_mut(), field) {
                        item.push(field, &String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"item" => {
                        if let Some(done) = item.take() {
                            return Ok(Some(done));
                        }
                    }
                    b"link" | b"description" => field = None,
                    _ => {}
                },
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

/// The three positional fields of an item description:
/// `scene_status:<status>,orderid:<id>,orderdate:<date>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionFields {
    pub status: Option<String>,
    pub order_id: String,
    pub order_date: Option<String>,
}

fn field_value(field: &str) -> Option<&str> {
    field.split_once(':').map(|(_, v)| v.trim())
}

impl DescriptionFields {
    /// The order id is always the second field, whatever its key says.
    pub fn parse(description: &str) -> Result<Self, EntryError> {
        let bad = || EntryError::BadDescription(description.to_string());
        let mut fields = description.trim().splitn(3, ',');
        let status = fields.next().and_then(field_value).map(str::to_string);
        let order_id = fields
            .next()
            .and_then(field_value)
            .filter(|v| !v.is_empty())
            .ok_or_else(bad)?
            .to_string();
        let order_date = fields.next().and_then(field_value).map(str::to_string);
        Ok(DescriptionFields {
            status,
            order_id,
            order_date,
        })
    }
}
