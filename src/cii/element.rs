use super::cii_ns;

/// XML namespaces used by a Cross Industry Invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Root message (`rsm`).
    Rsm,
    /// Reusable aggregate business information entities (`ram`).
    Ram,
    /// Qualified data types (`qdt`).
    Qdt,
    /// Unqualified data types (`udt`).
    Udt,
    /// XML Schema instance (`xsi`).
    Xsi,
}

impl Namespace {
    /// All namespaces, in the order they are declared on the root element.
    pub const ALL: [Namespace; 5] = [
        Namespace::Rsm,
        Namespace::Ram,
        Namespace::Qdt,
        Namespace::Udt,
        Namespace::Xsi,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Rsm => "rsm",
            Self::Ram => "ram",
            Self::Qdt => "qdt",
            Self::Udt => "udt",
            Self::Xsi => "xsi",
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Rsm => cii_ns::RSM,
            Self::Ram => cii_ns::RAM,
            Self::Qdt => cii_ns::QDT,
            Self::Udt => cii_ns::UDT,
            Self::Xsi => cii_ns::XSI,
        }
    }

    /// The `xmlns:prefix` attribute name declaring this namespace.
    pub fn declaration(&self) -> &'static str {
        match self {
            Self::Rsm => "xmlns:rsm",
            Self::Ram => "xmlns:ram",
            Self::Qdt => "xmlns:qdt",
            Self::Udt => "xmlns:udt",
            Self::Xsi => "xmlns:xsi",
        }
    }
}

/// A namespace-qualified element with attributes and either text or children.
///
/// The document builder assembles a tree of these and the writer serializes
/// it in a single pass. Attribute and child order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Namespace,
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(namespace: Namespace, name: &'static str) -> Self {
        Self {
            namespace,
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Shorthand for an element in the `ram` namespace.
    pub fn ram(name: &'static str) -> Self {
        Self::new(Namespace::Ram, name)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append `child` only if present.
    pub fn with_optional_child(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `prefix:name`, as written to the document.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.name)
    }

    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of local names through first-matching children.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }
}
