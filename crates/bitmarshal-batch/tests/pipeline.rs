use bitmarshal::bit_stream::BitStream;
use bitmarshal::decode::FieldDecoder;
use bitmarshal::layout::{FieldSpec, Layout};
use bitmarshal::value::{ColumnValues, TaggedValue, ValueKind};
use bitmarshal_batch::catalog::{CachedCatalog, EntityMeta, EnumMeta, StaticLoader};
use bitmarshal_batch::store::MemoryStore;
use bitmarshal_batch::{BatchError, BatchWriteOptions, BatchWriter, CatalogError};

fn layout() -> Layout {
    let mut x = FieldDecoder::new(ValueKind::Int, 12);
    x.set_null_value(0xFFF);

    let mut y = FieldDecoder::new(ValueKind::Double, 16);
    y.set_signed(true).set_scale(0.5).set_unit("V");

    let mut name = FieldDecoder::new(ValueKind::String, 16);
    name.set_zero_terminated(true);

    Layout::compile(&[
        FieldSpec::new("x", x).with_skip(4),
        FieldSpec::new("y", y),
        FieldSpec::new("name", name),
    ])
    .unwrap()
}

fn catalog() -> CachedCatalog<StaticLoader> {
    CachedCatalog::new(
        StaticLoader::new()
            .with_entity(
                EntityMeta::new("frame")
                    .with_identity("id", ValueKind::Long)
                    .with_attribute("x", ValueKind::Int)
                    .with_attribute("y", ValueKind::Double)
                    .with_attribute("name", ValueKind::String)
                    .with_attribute("quality", ValueKind::Enum),
            )
            .with_enumeration(EnumMeta::new("quality").with_item("good", 0).with_item("bad", 1)),
    )
}

const PACKETS: [u8; 12] = [
    // x = 42, y = 20 * 0.5, name = "ab"
    0x00, 0x2A, 0x00, 0x14, b'a', b'b',
    // x = null, y = -2 * 0.5, name = ""
    0x0F, 0xFF, 0xFF, 0xFE, 0x00, 0x00,
];

#[test]
fn test_decode_and_commit_packets() {
    let layout = layout();
    let catalog = catalog();
    let store = MemoryStore::new();
    let mut writer = BatchWriter::new("frame", &catalog, &store);

    let mut stream = BitStream::new(&PACKETS);
    while stream.available() > 0 {
        let record = layout.decode_stream(&mut stream).unwrap();
        writer.append_row(record).unwrap();
    }
    assert_eq!(writer.row_count(), 2);

    assert_eq!(writer.execute_batch(), Ok(vec![1, 2]));

    let request = &store.requests()[0];
    assert_eq!(request.entity, "frame");
    assert_eq!(request.row_count, 2);

    let x = &request.columns["x"];
    assert_eq!(x.validity, vec![true, false]);
    assert_eq!(x.values, ColumnValues::Int(vec![42, 0]));

    let y = &request.columns["y"];
    assert_eq!(y.values, ColumnValues::Double(vec![10.0, -1.0]));
    assert_eq!(y.unit.as_deref(), Some("V"));

    let name = &request.columns["name"];
    assert_eq!(name.validity, vec![true, false]);
    assert_eq!(
        name.values,
        ColumnValues::String(vec!["ab".to_string(), String::new()])
    );
}

#[test]
fn test_short_trailing_packet_is_rejected() {
    let layout = layout();
    let mut stream = BitStream::new(&PACKETS[..10]);

    assert!(layout.decode_stream(&mut stream).is_ok());
    assert!(layout.decode_stream(&mut stream).is_err());
    assert_eq!(stream.available(), 32);
}

#[test]
fn test_single_row_with_enum_literal() {
    let catalog = catalog();
    let store = MemoryStore::new();
    let mut writer = BatchWriter::new("frame", &catalog, &store)
        .with_options(BatchWriteOptions::default().with_auto_start_row(false));

    writer.new_row().unwrap();
    writer.set_value("x", TaggedValue::new(7i32)).unwrap();
    writer.set_enum_literal("quality", "quality", "bad").unwrap();
    assert_eq!(writer.execute(), Ok(1));

    let request = &store.requests()[0];
    assert_eq!(request.columns["quality"].values, ColumnValues::Enum(vec![1]));
    assert_eq!(catalog.cached_entities(), 1);
}

#[test]
fn test_unknown_entity_fails_commit() {
    let catalog = catalog();
    let store = MemoryStore::new();
    let mut writer = BatchWriter::new("nowhere", &catalog, &store);

    writer.set_value("x", TaggedValue::new(1i32)).unwrap();
    assert!(matches!(
        writer.execute(),
        Err(BatchError::Catalog(CatalogError::UnknownEntity(_)))
    ));
    assert_eq!(store.request_count(), 0);
}

#[test]
fn test_writers_share_catalog_across_threads() {
    let catalog = catalog();
    let store = MemoryStore::new();

    std::thread::scope(|scope| {
        for i in 0..4i32 {
            let catalog = &catalog;
            let store = &store;
            scope.spawn(move || {
                let mut writer = BatchWriter::new("frame", catalog, store);
                writer.append_row([("x", TaggedValue::new(i))]).unwrap();
                writer.append_row([("x", TaggedValue::new(i + 10))]).unwrap();
                assert_eq!(writer.execute_batch().unwrap().len(), 2);
            });
        }
    });

    assert_eq!(store.request_count(), 4);
    assert!(store.requests().iter().all(|r| r.columns["x"].len() == 2));
}
