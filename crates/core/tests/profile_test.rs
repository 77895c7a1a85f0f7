mod common;

use common::Builder;
use custos_core::Document;
use custos_core::profile::{
    ArchivalLevelAProfile, ArchivalProfile, LimitsProfile, Profile, StructureTree,
    TaggedProfile, is_block_level_type, is_standard_structure_type,
};
use std::rc::Rc;

fn archival_builder() -> Builder {
    Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /Metadata 3 0 R \
             /MarkInfo << /Marked true >> /StructTreeRoot 4 0 R >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .stream(
            3,
            "<< /Type /Metadata /Subtype /XML /Length 12 >>",
            b"<x:xmpmeta/>",
        )
        .object(4, "<< /Type /StructTreeRoot /K 5 0 R >>")
        .object(5, "<< /Type /StructElem /S /Document /K [ 6 0 R ] >>")
        .object(6, "<< /Type /StructElem /S /P >>")
        .trailer_extra(" /ID [ (f1d) (f1d) ]")
}

#[test]
fn minimal_document_is_in_limits_only() {
    let doc = Document::from_slice(&common::minimal()).unwrap();
    assert!(LimitsProfile.satisfies(&doc));
    assert!(!TaggedProfile.satisfies(&doc));
    assert!(!ArchivalProfile::new().satisfies(&doc));
}

#[test]
fn tagged_document_satisfies_tagged_profile() {
    let doc = Document::from_slice(&common::tagged()).unwrap();
    assert!(TaggedProfile.satisfies(&doc));
    let tree = StructureTree::new(&doc);
    assert!(tree.is_present());
    assert!(tree.is_valid());
}

#[test]
fn marked_without_structure_tree_is_not_tagged() {
    let data = Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /MarkInfo << /Marked true >> >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .finish();
    let doc = Document::from_slice(&data).unwrap();
    assert!(!TaggedProfile.satisfies(&doc));
    assert!(!StructureTree::new(&doc).is_present());
}

#[test]
fn marked_name_instead_of_boolean_does_not_count() {
    let data = Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /MarkInfo << /Marked /true >> \
             /StructTreeRoot 3 0 R >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .object(3, "<< /Type /StructTreeRoot >>")
        .finish();
    let doc = Document::from_slice(&data).unwrap();
    assert!(!TaggedProfile.satisfies(&doc));
}

#[test]
fn nonstandard_structure_type_invalidates_the_tree() {
    let data = Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /MarkInfo << /Marked true >> \
             /StructTreeRoot 3 0 R >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .object(3, "<< /Type /StructTreeRoot /K 4 0 R >>")
        // "table" is not "Table"; membership is case-sensitive.
        .object(4, "<< /Type /StructElem /S /table >>")
        .finish();
    let doc = Document::from_slice(&data).unwrap();
    let tree = StructureTree::new(&doc);
    assert!(tree.is_present());
    assert!(!tree.is_valid());
    assert!(!TaggedProfile.satisfies(&doc));
}

#[test]
fn role_mapped_custom_type_is_accepted() {
    let data = Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /MarkInfo << /Marked true >> \
             /StructTreeRoot 3 0 R >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .object(
            3,
            "<< /Type /StructTreeRoot /K 4 0 R /RoleMap << /Chap /H1 >> >>",
        )
        .object(4, "<< /Type /StructElem /S /Chap >>")
        .finish();
    let doc = Document::from_slice(&data).unwrap();
    assert!(StructureTree::new(&doc).is_valid());
}

#[test]
fn archival_fixture_satisfies_both_levels() {
    let doc = Document::from_slice(&archival_builder().finish()).unwrap();
    let base = Rc::new(ArchivalProfile::new());
    let level_a = ArchivalLevelAProfile::with_base(Rc::clone(&base));
    assert!(base.satisfies(&doc));
    assert!(level_a.satisfies(&doc));
}

#[test]
fn encryption_breaks_the_archival_profile() {
    let data = archival_builder()
        .trailer_extra(" /ID [ (f1d) (f1d) ] /Encrypt 9 0 R")
        .finish();
    let doc = Document::from_slice(&data).unwrap();
    assert!(!ArchivalProfile::new().satisfies(&doc));
    assert!(!ArchivalLevelAProfile::new().satisfies(&doc));
}

#[test]
fn missing_file_id_breaks_the_archival_profile() {
    let data = archival_builder().trailer_extra("").finish();
    let doc = Document::from_slice(&data).unwrap();
    assert!(!ArchivalProfile::new().satisfies(&doc));
}

#[test]
fn level_a_reuses_the_shared_base_verdict() {
    let doc = Document::from_slice(&archival_builder().finish()).unwrap();
    let base = Rc::new(ArchivalProfile::new());
    // Prime the base; level A must agree with the cached answer.
    assert!(base.result(&doc));
    let level_a = ArchivalLevelAProfile::with_base(base);
    assert!(level_a.satisfies(&doc));
}

#[test]
fn level_a_reuses_a_failed_base_verdict() {
    // minimal() fails the base profile (no /ID, no metadata). Prime
    // the shared instance, then the composed profile must fail off the
    // cached answer.
    let doc = Document::from_slice(&common::minimal()).unwrap();
    let base = Rc::new(ArchivalProfile::new());
    assert!(!base.result(&doc));
    let level_a = ArchivalLevelAProfile::with_base(base);
    assert!(!level_a.satisfies(&doc));
}

#[test]
fn vocabulary_membership() {
    for name in ["Document", "BibEntry", "H6", "Formula"] {
        assert!(is_standard_structure_type(name), "{name}");
    }
    for name in ["AnnexA", "document", "h1", ""] {
        assert!(!is_standard_structure_type(name), "{name}");
    }
    assert!(is_block_level_type("LBody"));
    assert!(!is_block_level_type("TR"));
}
