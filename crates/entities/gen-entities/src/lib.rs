use proc_macro::TokenStream;
use quote::quote;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use syn::{parse_macro_input, LitStr};

#[derive(Deserialize)]
struct DeserializedJsonEntity {
    characters: Box<str>,
}

/// Resolves `file_path` relative to the manifest dir of the crate invoking the
/// macro, so callers don't need to know the workspace layout from their own
/// source tree.
fn resolve_data_path(file_path: &str) -> std::path::PathBuf {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set by cargo");
    Path::new(&manifest_dir).join(file_path)
}

fn process_file(file_path: &str) -> BTreeMap<[u8; 2], Vec<(Vec<u8>, Vec<u8>)>> {
    let full_path = resolve_data_path(file_path);
    let json_content = fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to read entity table: {}", full_path.display()));

    let entities: BTreeMap<String, DeserializedJsonEntity> =
        serde_json::from_str(&json_content).expect("Failed to parse entity table JSON");

    let mut prefix_map: BTreeMap<[u8; 2], Vec<(Vec<u8>, Vec<u8>)>> = BTreeMap::new();

    for (entity_name, entity_data) in entities {
        // Every entry is keyed by its reference including the leading '&'; we
        // require at least two characters after it to form a lookup prefix.
        if entity_name.len() <= 2 {
            continue;
        }

        let entity_without_amp = &entity_name[1..];
        let entity_bytes = entity_without_amp.as_bytes();
        let prefix = [entity_bytes[0], entity_bytes[1]];
        let suffix = entity_bytes[2..].to_vec();
        let bytes = entity_data.characters.as_bytes().to_vec();

        prefix_map.entry(prefix).or_default().push((suffix, bytes));
    }

    // Longer suffixes first so the greedy match in `entities::decode_html_ref`
    // prefers the longest entity name that actually matches.
    for entries in prefix_map.values_mut() {
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
    }

    prefix_map
}

#[proc_macro]
pub fn entities_lookup(input: TokenStream) -> TokenStream {
    let file_path = parse_macro_input!(input as LitStr).value();
    let prefix_map = process_file(&file_path);

    let mut prefix_entries = Vec::new();
    for (prefix, suffixes) in prefix_map {
        let prefix_bytes = [prefix[0], prefix[1]];
        let mut suffix_entries = Vec::new();

        for (suffix, bytes) in suffixes {
            let suffix_bytes: Vec<_> = suffix.iter().map(|&b| quote! { #b }).collect();
            let char_bytes: Vec<_> = bytes.iter().map(|&b| quote! { #b }).collect();

            suffix_entries.push(quote! {
                (
                    Box::leak(Box::new([#(#suffix_bytes),*])) as &'static [u8],
                    Box::leak(Box::new([#(#char_bytes),*])) as &'static [u8]
                )
            });
        }

        prefix_entries.push(quote! {
            ([#(#prefix_bytes),*], Box::leak(Box::new([#(#suffix_entries),*])) as &'static [(&'static [u8], &'static [u8])])
        });
    }

    let result = quote! {
        use lazy_static::lazy_static;
        use std::collections::BTreeMap;

        lazy_static! {
            static ref ENTITIES: BTreeMap<[u8; 2], &'static [(&'static [u8], &'static [u8])]> = {
                let mut map = BTreeMap::new();
                #(map.insert(#prefix_entries.0, #prefix_entries.1);)*
                map
            };
        }
    };

    result.into()
}
