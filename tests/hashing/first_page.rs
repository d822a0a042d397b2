//! First-page digest behavior.

use authhash::{HashAlgorithm, HashContext, PeImage, DEFAULT_PAGE_SIZE};

use crate::common::PeBuilder;

fn first_page(bytes: &[u8], page_size: u32) -> String {
    PeImage::from_bytes(bytes)
        .and_then(|image| image.first_page_digest(HashAlgorithm::Sha256, page_size))
        .map(|d| d.to_hex())
        .expect("first-page digest")
}

#[test]
fn first_page_matches_manual_computation() {
    let builder = PeBuilder::pe32plus().size_of_headers(0x400).section(0x2000);
    let data = builder.build();
    let cs = builder.checksum_offset();
    let so = builder.security_offset();

    let mut ctx = HashContext::new(HashAlgorithm::Sha256);
    ctx.update(&data[..cs]);
    ctx.update(&data[cs + 4..so]);
    ctx.update(&data[so + 8..0x400]);
    ctx.pad_with_zeros(u64::from(DEFAULT_PAGE_SIZE) - 0x400);

    assert_eq!(first_page(&data, DEFAULT_PAGE_SIZE), ctx.finalize().to_hex());
}

#[test]
fn first_page_covers_exactly_one_page() {
    let data = PeBuilder::pe32().size_of_headers(0x200).section(0x100).build();
    let image = PeImage::from_bytes(&data).unwrap();

    let plan = image.first_page_plan(DEFAULT_PAGE_SIZE);
    assert_eq!(plan.skipped.len(), 2);
    assert!(plan.hashed.iter().all(|r| r.end <= 0x200));
    assert_eq!(
        plan.hashed_len() + plan.skipped_len() + plan.padding,
        u64::from(DEFAULT_PAGE_SIZE)
    );
}

#[test]
fn first_page_ignores_section_data_and_signature() {
    let unsigned = PeBuilder::pe32().section(0x200).build();
    let signed = PeBuilder::pe32()
        .section(0x200)
        .certificate(&[0x99; 0x28])
        .build();
    let mut patched = unsigned.clone();
    patched[0x450] ^= 0xFF;

    let baseline = first_page(&unsigned, DEFAULT_PAGE_SIZE);
    assert_eq!(first_page(&signed, DEFAULT_PAGE_SIZE), baseline);
    assert_eq!(first_page(&patched, DEFAULT_PAGE_SIZE), baseline);
}

#[test]
fn first_page_detects_header_changes() {
    let data = PeBuilder::pe32plus().section(0x200).build();
    let mut patched = data.clone();
    patched[0x3F0] = 0x42;
    assert_ne!(
        first_page(&data, DEFAULT_PAGE_SIZE),
        first_page(&patched, DEFAULT_PAGE_SIZE)
    );
}

#[test]
fn page_smaller_than_headers() {
    let builder = PeBuilder::pe32().size_of_headers(0x400).section(0x100);
    let data = builder.build();

    let mut ctx = HashContext::new(HashAlgorithm::Sha256);
    ctx.update(&data[..builder.checksum_offset()]);
    ctx.update(&data[builder.checksum_offset() + 4..builder.security_offset()]);
    ctx.update(&data[builder.security_offset() + 8..0x200]);

    assert_eq!(first_page(&data, 0x200), ctx.finalize().to_hex());
}

#[test]
fn first_page_differs_from_authenticode() {
    let data = PeBuilder::pe32plus().section(0x200).build();
    let image = PeImage::from_bytes(&data).unwrap();
    let full = image.authenticode_digest(HashAlgorithm::Sha1).unwrap();
    let page = image
        .first_page_digest(HashAlgorithm::Sha1, DEFAULT_PAGE_SIZE)
        .unwrap();
    assert_eq!(full.len(), page.len());
    assert_ne!(full, page);
}
