//! Security directory and header validation through the public API.

use authhash::{hash_image, HashConfig, HashError, PeImage};

use crate::common::{put_u16, put_u32, PeBuilder};

#[test]
fn directory_inside_last_section_is_rejected() {
    let builder = PeBuilder::pe32().section(0x200).section(0x200);
    let mut data = builder.build();
    // Point into the second section's raw data [0x600, 0x800).
    put_u32(&mut data, builder.security_offset(), 0x700);
    put_u32(&mut data, builder.security_offset() + 4, 0x10);

    let err = PeImage::from_bytes(&data).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        err,
        HashError::BadSecurityDirectoryVirtualAddress {
            virtual_address: 0x700,
            lower_bound: 0x800,
            file_size: 0x800,
        }
    ));
}

#[test]
fn directory_past_end_of_file_is_rejected() {
    let builder = PeBuilder::pe32plus().section(0x200);
    let mut data = builder.build();
    put_u32(&mut data, builder.security_offset(), 0x1000);

    assert!(matches!(
        PeImage::from_bytes(&data),
        Err(HashError::BadSecurityDirectoryVirtualAddress {
            virtual_address: 0x1000,
            ..
        })
    ));
}

#[test]
fn oversized_blob_is_rejected() {
    let builder = PeBuilder::pe32plus()
        .section(0x200)
        .certificate(&[0x77; 0x40]);
    let mut data = builder.build();
    put_u32(&mut data, builder.security_offset() + 4, 0x41);

    assert!(matches!(
        PeImage::from_bytes(&data),
        Err(HashError::BadSecurityDirectorySize {
            size: 0x41,
            available: 0x40
        })
    ));
}

#[test]
fn signature_without_sections_is_rejected() {
    let builder = PeBuilder::pe32();
    let mut data = builder.build();
    put_u32(&mut data, builder.security_offset(), 0x200);

    assert!(matches!(
        PeImage::from_bytes(&data),
        Err(HashError::BadSectionCount)
    ));
}

#[test]
fn unknown_optional_header_magic_is_rejected() {
    let mut data = PeBuilder::pe32().section(0x100).build();
    put_u16(&mut data, 0x80 + 24, 0x107);

    assert!(matches!(
        PeImage::from_bytes(&data),
        Err(HashError::BadOptionalHeaderMagic(0x107))
    ));
}

#[test]
fn non_pe_input_is_invalid_image() {
    let mut data = PeBuilder::pe32().section(0x100).build();
    data[0x80] = b'X';

    let err = hash_image(&data, &HashConfig::default()).unwrap_err();
    assert!(matches!(err, HashError::InvalidImage(_)));
    assert!(!err.is_validation());
}

#[test]
fn truncated_section_table_rejects_unsigned_image() {
    let mut data = PeBuilder::pe32().section(0x100).build();
    // 0x100 entries at 0x178 run far past the 0x500-byte file.
    put_u16(&mut data, 0x80 + 6, 0x100);

    let err = PeImage::from_bytes(&data).unwrap_err();
    assert!(matches!(err, HashError::InvalidImage(_)));
    assert!(!err.is_validation());
}

#[test]
fn unsigned_image_skips_directory_validation() {
    // No sections and no signature: still hashable.
    let data = PeBuilder::pe32plus().build();
    let report = hash_image(&data, &HashConfig::default()).unwrap();
    assert!(!report.signed);
    assert_eq!(report.file_size, 0x400);
}
