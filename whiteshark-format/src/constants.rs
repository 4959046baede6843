//! Constants and magic numbers for the WhiteShark format

/// Stream magic bytes: "WSFI"
pub const FORMAT_MAGIC: [u8; 4] = *b"WSFI";

/// Format version written by the serializer and accepted by the decoders.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed stream header (magic + identifier + version + options).
pub const HEADER_LEN: usize = 12;

/// Size of the stream identifier stored after the magic bytes.
pub const IDENTIFIER_LEN: usize = 4;

/// Option flag serializing every object without a type reference.
pub const OPTION_OBJECTS_AS_GENERICS: u16 = 1 << 0;
/// Options understood by this implementation; other bits are reserved.
pub const OPTIONS_KNOWN_MASK: u16 = OPTION_OBJECTS_AS_GENERICS;

/// Property-name prefix marking a map entry; the key follows the prefix.
pub const MAP_ENTRY_PREFIX: &str = ":m:";
/// Property name marking a positional collection item.
pub const COLLECTION_ITEM_NAME: &str = ":ci:";

/// Mask selecting the data type from a tag byte.
pub const TAG_TYPE_MASK: u8 = 0x0F;
/// Shift of the metadata nibble in a tag byte.
pub const TAG_META_SHIFT: u32 = 4;
/// Boolean tag bit carrying the value.
pub const TAG_BOOL_TRUE: u8 = 0x10;
/// Real tag bit selecting double precision.
pub const TAG_REAL_DOUBLE: u8 = 0x10;
/// Mask covering the 2-bit length selector of strings, arrays and objects.
pub const TAG_LENGTH_MASK: u8 = 0x30;
/// Array/object tag bit: the type reference is a dictionary index.
pub const TAG_TYPE_IN_DICTIONARY: u8 = 0x40;
/// Object tag bit: the object carries no type reference.
pub const TAG_GENERICS: u8 = 0x80;
/// Property tag bit: the name is a dictionary index.
pub const TAG_NAME_IN_DICTIONARY: u8 = 0x40;
/// Property tag bit: the inline name length is stored on two bytes.
pub const TAG_LONG_NAME: u8 = 0x10;

/// Maximum number of entries a dictionary can address (u16 indices).
pub const MAX_DICTIONARY_ENTRIES: usize = u16::MAX as usize + 1;
