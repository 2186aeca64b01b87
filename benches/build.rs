use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use area_datamine::execution::{BuildOptions, Pipeline};
use area_datamine::ingestion::ExportInput;
use area_datamine::processing::{AreaMatch, RawColumn, RawSheet};

fn sheet(name: &str, header: &[&str], data: Vec<Vec<Value>>) -> RawSheet {
    RawSheet {
        filename: name.to_string(),
        header: header.iter().map(|h| RawColumn::new(*h)).collect(),
        data,
    }
}

fn synthetic_export(areas: usize, langs: usize) -> ExportInput {
    let world_areas = (0..areas)
        .map(|i| {
            let map = i % 3 == 0;
            vec![json!(format!("Area{i}")), json!(i % 50 == 0), json!(false), json!(map), json!(false)]
        })
        .collect();
    let visuals = (0..areas).map(|i| vec![json!(format!("Art/Maps/{i}.dds"))]).collect();
    let atlas = (0..areas / 2)
        .map(|i| vec![json!(i), json!(i), json!(0), json!(format!("Art/Atlas/{i}.dds"))])
        .collect();

    let sheets = vec![
        sheet(
            "WorldAreas.dat",
            &["Id", "IsTown", "IsHideout", "IsMapArea", "IsUniqueMapArea"],
            world_areas,
        ),
        sheet("ItemVisualIdentity.dat", &["DDSFile"], visuals),
        sheet("AtlasRegions.dat", &["Name"], vec![vec![json!("Region")]]),
        sheet("UniqueMaps.dat", &["WorldAreasKey", "ItemVisualIdentityKey"], vec![]),
        sheet(
            "AtlasNode.dat",
            &["WorldAreasKey", "ItemVisualIdentityKey", "AtlasRegionsKey", "DDSFile"],
            atlas,
        ),
    ];

    let names: Vec<Vec<Value>> = (0..areas)
        .map(|i| vec![json!(format!("Area{i}")), json!(format!("Name {i}"))])
        .collect();
    let mut lang_map = BTreeMap::new();
    for l in 0..langs {
        lang_map.insert(
            format!("lang{l}"),
            vec![
                sheet("WorldAreas.dat", &["Id", "Name"], names.clone()),
                sheet(
                    "BackendErrors.dat",
                    &["Id", "Text"],
                    vec![vec![json!("EnteredArea"), json!("You have entered {0}.")]],
                ),
            ],
        );
    }

    ExportInput {
        sheets,
        langs: lang_map,
    }
}

fn bench_build(c: &mut Criterion) {
    let input = synthetic_export(5_000, 8);
    let pipeline = Pipeline::new(BuildOptions {
        area_match: AreaMatch::SourcePosition,
        ..Default::default()
    })
    .unwrap();

    c.bench_function("build_5k_areas_8_langs", |b| {
        b.iter(|| pipeline.build(black_box(input.clone())).unwrap())
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
