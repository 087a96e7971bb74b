//! Registration metadata for the `rar` extension module.

use std::fmt;

/// Qualified function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName {
    pub local_name: &'static str,
    pub namespace_uri: &'static str,
    pub prefix: &'static str,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    String,
    Function,
    Item,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "xs:string",
            Self::Function => "function(*)",
            Self::Item => "item()",
        }
    }
}

/// Occurrence indicator of a parameter or return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    ZeroOrMore,
}

impl Cardinality {
    pub fn indicator(self) -> &'static str {
        match self {
            Self::ExactlyOne => "",
            Self::ZeroOrMore => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub item_type: ItemType,
    pub cardinality: Cardinality,
    pub description: &'static str,
}

impl Parameter {
    const fn new(
        name: &'static str,
        item_type: ItemType,
        cardinality: Cardinality,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            item_type,
            cardinality,
            description,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} as {}{}",
            self.name,
            self.item_type.as_str(),
            self.cardinality.indicator()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: QName,
    pub description: &'static str,
    pub parameters: &'static [Parameter],
    pub return_type: (ItemType, Cardinality),
}

impl FunctionSignature {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        let (item_type, cardinality) = self.return_type;
        write!(f, ") as {}{}", item_type.as_str(), cardinality.indicator())
    }
}

const UNRAR_PARAMETERS: &[Parameter] = &[
    Parameter::new(
        "file",
        ItemType::String,
        Cardinality::ExactlyOne,
        "Path of the first volume of the rar archive",
    ),
    Parameter::new(
        "entry-filter",
        ItemType::Function,
        Cardinality::ExactlyOne,
        "A user defined function for filtering resources from the rar file. \
         The function takes 3 parameters e.g. \
         user:unrar-entry-filter($path as xs:string, $data-type as xs:string, \
         $param as item()*) as xs:boolean. $data-type may be 'resource' or 'folder'. \
         $param is a sequence with any additional parameters, \
         for example a list of extracted files. If the return type is true() it indicates \
         the entry should be processed and passed to the entry-data function, \
         else the resource is skipped.",
    ),
    Parameter::new(
        "entry-filter-param",
        ItemType::Item,
        Cardinality::ZeroOrMore,
        "A sequence with an additional parameters for filtering function.",
    ),
    Parameter::new(
        "entry-data",
        ItemType::Function,
        Cardinality::ExactlyOne,
        "A user defined function for storing an extracted resource from the rar file. \
         The function takes 4 parameters e.g. \
         user:unrar-entry-data($path as xs:string, $data-type as xs:string, \
         $data as item()?, $param as item()*). \
         Or a user defined function which returns path for storing an extracted resource \
         from the rar file. The function takes 3 parameters e.g. \
         user:entry-path($path as xs:string, $data-type as xs:string, \
         $param as item()*) as xs:anyURI. $data-type may be 'resource' or 'folder'. \
         $param is a sequence with any additional parameters.",
    ),
    Parameter::new(
        "entry-data-param",
        ItemType::Item,
        Cardinality::ZeroOrMore,
        "A sequence with an additional parameters for storing function.",
    ),
];

static SIGNATURES: [FunctionSignature; 1] = [RarModule::UNRAR];

/// The `rar` module and its single function.
#[derive(Debug, Clone, Copy, Default)]
pub struct RarModule;

impl RarModule {
    pub const NAMESPACE_URI: &'static str = "http://exist-db.org/xquery/compression/rar";
    pub const PREFIX: &'static str = "rar";
    pub const INCLUSION_DATE: &'static str = "2013-07-08";
    pub const RELEASED_IN_VERSION: &'static str = "eXist-2.1";
    pub const DESCRIPTION: &'static str = "A module for compression and decompression RAR functions";

    pub const UNRAR: FunctionSignature = FunctionSignature {
        name: QName {
            local_name: "unrar",
            namespace_uri: Self::NAMESPACE_URI,
            prefix: Self::PREFIX,
        },
        description: "Unrar all the resources/folders from the provided data by calling user \
                      defined functions to determine what and how to store the \
                      resources/folders",
        parameters: UNRAR_PARAMETERS,
        return_type: (ItemType::Item, Cardinality::ZeroOrMore),
    };

    pub fn signatures(&self) -> &'static [FunctionSignature] {
        &SIGNATURES
    }

    /// Look up a function by local name.
    pub fn function(&self, local_name: &str) -> Option<&'static FunctionSignature> {
        self.signatures()
            .iter()
            .find(|sig| sig.name.local_name == local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unrar() {
        let sig = RarModule.function("unrar").unwrap();
        assert_eq!(sig.arity(), 5);
        assert_eq!(sig.name.to_string(), "rar:unrar");
        assert_eq!(sig.name.namespace_uri, RarModule::NAMESPACE_URI);
        assert!(RarModule.function("unzip").is_none());
    }

    #[test]
    fn test_signature_display() {
        let rendered = RarModule::UNRAR.to_string();
        assert!(rendered.starts_with("rar:unrar($file as xs:string, $entry-filter as function(*)"));
        assert!(rendered.ends_with(") as item()*"));
    }

    #[test]
    fn test_parameter_display() {
        let params = RarModule::UNRAR.parameters;
        assert_eq!(params[0].to_string(), "$file as xs:string");
        assert_eq!(params[2].to_string(), "$entry-filter-param as item()*");
        assert_eq!(params[3].cardinality, Cardinality::ExactlyOne);
    }

    #[test]
    fn test_module_metadata() {
        assert_eq!(
            RarModule::DESCRIPTION,
            "A module for compression and decompression RAR functions"
        );
        assert_eq!(RarModule::PREFIX, "rar");
        assert_eq!(RarModule.signatures().len(), 1);
    }
}
