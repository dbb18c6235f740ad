//! The standard highlighting vocabulary.
//!
//! A closed, hierarchical set of tags that language packages assign and
//! styles map. Child tags fall back to their parent when a style has no
//! entry for them, so a style only needs to cover the tags it cares
//! about: a style mapping [`COMMENT`] colours [`LINE_COMMENT`] and
//! [`BLOCK_COMMENT`] too, unless it maps those explicitly.
//!
//! The modifiers at the bottom of this module mark orthogonal attributes
//! and can be combined with any tag, e.g. `definition(&VARIABLE_NAME)`;
//! see [`crate::Modifier`] for their algebra.

use once_cell::sync::Lazy;

use crate::tag::{Modifier, Tag};

fn root() -> Tag {
    Tag::define(None).expect("tags without a parent always define")
}

fn t(parent: &Tag) -> Tag {
    Tag::define(Some(parent))
        .expect("standard tags derive from unmodified parents")
}

/// A comment.
pub static COMMENT: Lazy<Tag> = Lazy::new(root);
/// A line comment.
pub static LINE_COMMENT: Lazy<Tag> = Lazy::new(|| t(&COMMENT));
/// A block comment.
pub static BLOCK_COMMENT: Lazy<Tag> = Lazy::new(|| t(&COMMENT));
/// A documentation comment.
pub static DOC_COMMENT: Lazy<Tag> = Lazy::new(|| t(&COMMENT));

/// Any kind of identifier.
pub static NAME: Lazy<Tag> = Lazy::new(root);
/// The name of a variable.
pub static VARIABLE_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// The name of a type.
pub static TYPE_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// A tag name, as in XML or HTML.
pub static TAG_NAME: Lazy<Tag> = Lazy::new(|| t(&TYPE_NAME));
/// The name of a property or field.
pub static PROPERTY_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// An attribute name, as in XML or HTML.
pub static ATTRIBUTE_NAME: Lazy<Tag> = Lazy::new(|| t(&PROPERTY_NAME));
/// The name of a class.
pub static CLASS_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// A label name.
pub static LABEL_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// A namespace name.
pub static NAMESPACE: Lazy<Tag> = Lazy::new(|| t(&NAME));
/// The name of a macro.
pub static MACRO_NAME: Lazy<Tag> = Lazy::new(|| t(&NAME));

/// A literal value.
pub static LITERAL: Lazy<Tag> = Lazy::new(root);
/// A string literal.
pub static STRING: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// A documentation string.
pub static DOC_STRING: Lazy<Tag> = Lazy::new(|| t(&STRING));
/// A character literal.
pub static CHARACTER: Lazy<Tag> = Lazy::new(|| t(&STRING));
/// An attribute value, as in XML or HTML.
pub static ATTRIBUTE_VALUE: Lazy<Tag> = Lazy::new(|| t(&STRING));
/// A number literal.
pub static NUMBER: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// An integer literal.
pub static INTEGER: Lazy<Tag> = Lazy::new(|| t(&NUMBER));
/// A floating-point literal.
pub static FLOAT: Lazy<Tag> = Lazy::new(|| t(&NUMBER));
/// A boolean literal.
pub static BOOL: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// A regular expression literal.
pub static REGEXP: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// An escape sequence, such as a backslash escape in a string.
pub static ESCAPE: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// A colour literal.
pub static COLOR: Lazy<Tag> = Lazy::new(|| t(&LITERAL));
/// A URL literal.
pub static URL: Lazy<Tag> = Lazy::new(|| t(&LITERAL));

/// A language keyword.
pub static KEYWORD: Lazy<Tag> = Lazy::new(root);
/// The keyword for the self or this object.
pub static SELF: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// The keyword for null or nil.
pub static NULL: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A keyword denoting some atomic value.
pub static ATOM: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A keyword that represents a unit.
pub static UNIT: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A modifier keyword.
pub static MODIFIER: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A keyword acting as an operator.
pub static OPERATOR_KEYWORD: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A control-flow keyword.
pub static CONTROL_KEYWORD: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A keyword that defines something.
pub static DEFINITION_KEYWORD: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));
/// A keyword related to modules or imports.
pub static MODULE_KEYWORD: Lazy<Tag> = Lazy::new(|| t(&KEYWORD));

/// An operator.
pub static OPERATOR: Lazy<Tag> = Lazy::new(root);
/// A dereferencing operator.
pub static DEREF_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// An arithmetic operator.
pub static ARITHMETIC_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A logical operator.
pub static LOGIC_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A bitwise operator.
pub static BITWISE_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A comparison operator.
pub static COMPARE_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// An update operator, like increment.
pub static UPDATE_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A defining operator.
pub static DEFINITION_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A type-level operator.
pub static TYPE_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));
/// A control-flow operator.
pub static CONTROL_OPERATOR: Lazy<Tag> = Lazy::new(|| t(&OPERATOR));

/// Punctuation.
pub static PUNCTUATION: Lazy<Tag> = Lazy::new(root);
/// Separating punctuation, like commas.
pub static SEPARATOR: Lazy<Tag> = Lazy::new(|| t(&PUNCTUATION));
/// Bracket-style punctuation.
pub static BRACKET: Lazy<Tag> = Lazy::new(|| t(&PUNCTUATION));
/// Angle brackets.
pub static ANGLE_BRACKET: Lazy<Tag> = Lazy::new(|| t(&BRACKET));
/// Square brackets.
pub static SQUARE_BRACKET: Lazy<Tag> = Lazy::new(|| t(&BRACKET));
/// Parentheses.
pub static PAREN: Lazy<Tag> = Lazy::new(|| t(&BRACKET));
/// Braces.
pub static BRACE: Lazy<Tag> = Lazy::new(|| t(&BRACKET));

/// Content, for document-like languages.
pub static CONTENT: Lazy<Tag> = Lazy::new(root);
/// A heading.
pub static HEADING: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// A level 1 heading.
pub static HEADING1: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A level 2 heading.
pub static HEADING2: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A level 3 heading.
pub static HEADING3: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A level 4 heading.
pub static HEADING4: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A level 5 heading.
pub static HEADING5: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A level 6 heading.
pub static HEADING6: Lazy<Tag> = Lazy::new(|| t(&HEADING));
/// A content separator, like a horizontal rule.
pub static CONTENT_SEPARATOR: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// List content.
pub static LIST: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// Quoted content.
pub static QUOTE: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// Emphasised content.
pub static EMPHASIS: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// Strong content.
pub static STRONG: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// A link.
pub static LINK: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// Monospaced content.
pub static MONOSPACE: Lazy<Tag> = Lazy::new(|| t(&CONTENT));
/// Struck-through content.
pub static STRIKETHROUGH: Lazy<Tag> = Lazy::new(|| t(&CONTENT));

/// Inserted text, in a diff-like format.
pub static INSERTED: Lazy<Tag> = Lazy::new(root);
/// Deleted text.
pub static DELETED: Lazy<Tag> = Lazy::new(root);
/// Changed text.
pub static CHANGED: Lazy<Tag> = Lazy::new(root);
/// Invalid or erroneous input.
pub static INVALID: Lazy<Tag> = Lazy::new(root);
/// Metadata or meta-instructions.
pub static META: Lazy<Tag> = Lazy::new(root);
/// Document metadata, like frontmatter.
pub static DOCUMENT_META: Lazy<Tag> = Lazy::new(|| t(&META));
/// An annotation or attribute.
pub static ANNOTATION: Lazy<Tag> = Lazy::new(|| t(&META));
/// A processing instruction.
pub static PROCESSING_INSTRUCTION: Lazy<Tag> = Lazy::new(|| t(&META));

static DEFINITION: Lazy<Modifier> = Lazy::new(Modifier::define);
static CONSTANT: Lazy<Modifier> = Lazy::new(Modifier::define);
static FUNCTION: Lazy<Modifier> = Lazy::new(Modifier::define);
static STANDARD: Lazy<Modifier> = Lazy::new(Modifier::define);
static LOCAL: Lazy<Modifier> = Lazy::new(Modifier::define);
static SPECIAL: Lazy<Modifier> = Lazy::new(Modifier::define);

/// Marks a tag as occurring at the place where the thing it names is
/// being defined.
pub fn definition(tag: &Tag) -> Tag {
    DEFINITION.apply(tag)
}

/// Marks a tag as naming a constant.
pub fn constant(tag: &Tag) -> Tag {
    CONSTANT.apply(tag)
}

/// Marks a tag as naming a function.
pub fn function(tag: &Tag) -> Tag {
    FUNCTION.apply(tag)
}

/// Marks a tag as standard, as in a built-in part of the language or
/// environment.
pub fn standard(tag: &Tag) -> Tag {
    STANDARD.apply(tag)
}

/// Marks a tag as local to some scope.
pub fn local(tag: &Tag) -> Tag {
    LOCAL.apply(tag)
}

/// Marks an unusual variant of a tag, like an interpolated string.
pub fn special(tag: &Tag) -> Tag {
    SPECIAL.apply(tag)
}
