use crate::utils::error::{ConsultaError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A namespace-agnostic element tree. Names are local names, so
/// `soapenv:Body` and `SOAP-ENV:Body` both read as `Body`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or_else(|| ConsultaError::Unexpected {
            detail: "XML document has no root element".to_string(),
        })
    }

    fn from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }
        Ok(XmlElement {
            name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Breadth-first, starting with `self`.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(current.children.iter());
            i += 1;
        }
        out
    }

    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().into_iter().find(|e| e.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `xsi:nil="true"`, as sent for absent optional values.
    pub fn is_nil(&self) -> bool {
        matches!(self.attribute("nil"), Some("true") | Some("1"))
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
