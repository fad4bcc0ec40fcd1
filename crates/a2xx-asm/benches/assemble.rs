#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use a2xx_asm::{AllocType, AluInstr, CfType, FetchInstr, RegFlags, ScalarOpcode, Shader, VectorOpcode};
#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Fetch four attributes, transform the position by a 4x4 matrix in C0..C3 and export it along
/// with one varying.
#[cfg(not(target_arch = "wasm32"))]
fn build_vertex_shader() -> Shader {
    let mut shader = Shader::new();
    shader.uniform_create(0, 4, Some("uMVP")).unwrap();

    let exec = shader.cf_create(CfType::Exec).unwrap();
    for (attr, format) in [(0u32, 0x39u32), (1, 0x39), (2, 0x06), (3, 0x39)] {
        shader.attribute_create(attr + 1, 1, None).unwrap();
        let fetch = shader
            .instr_create(exec, FetchInstr::vertex(attr, format, 16))
            .unwrap();
        shader.reg_create(fetch, attr + 1, Some("xyzw"), RegFlags::empty()).unwrap();
        shader.reg_create(fetch, 0, Some("x"), RegFlags::empty()).unwrap();
    }

    shader.alloc_create(AllocType::Coord, 0).unwrap();
    let exec = shader.cf_create(CfType::Exec).unwrap();
    for (row, swizzle) in ["xxxx", "yyyy", "zzzz", "wwww"].into_iter().enumerate() {
        let opc = if row == 0 {
            VectorOpcode::Mul
        } else {
            VectorOpcode::MulAdd
        };
        let instr = shader.instr_create(exec, AluInstr::new(opc)).unwrap();
        let flags = if row == 3 {
            RegFlags::EXPORT
        } else {
            RegFlags::empty()
        };
        shader.reg_create(instr, if row == 3 { 62 } else { 5 }, None, flags).unwrap();
        if row > 0 {
            shader.reg_create(instr, 5, None, RegFlags::empty()).unwrap();
        }
        shader.reg_create(instr, 1, Some(swizzle), RegFlags::empty()).unwrap();
        shader.reg_create(instr, row as u32, None, RegFlags::CONST).unwrap();
    }

    shader.alloc_create(AllocType::Parameter, 0).unwrap();
    let end = shader.cf_create(CfType::ExecEnd).unwrap();
    let instr = shader
        .instr_create(
            end,
            AluInstr::with_scalar(VectorOpcode::Max, ScalarOpcode::RecipIeee),
        )
        .unwrap();
    shader.reg_create(instr, 0, None, RegFlags::EXPORT).unwrap();
    shader.reg_create(instr, 2, None, RegFlags::empty()).unwrap();
    shader.reg_create(instr, 2, None, RegFlags::empty()).unwrap();
    shader.reg_create(instr, 0, Some("___w"), RegFlags::EXPORT).unwrap();
    shader.reg_create(instr, 3, Some("wwww"), RegFlags::empty()).unwrap();
    shader
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_assemble(c: &mut Criterion) {
    let template = build_vertex_shader();
    let mut out = vec![0u32; template.required_dwords() + 3];

    let mut group = c.benchmark_group("a2xx_assemble");
    group.bench_function("build", |b| {
        b.iter(|| black_box(build_vertex_shader().instr_count()))
    });
    group.bench_function("assemble", |b| {
        b.iter_batched(
            || template.clone(),
            |mut shader| black_box(shader.assemble(&mut out).unwrap().dwords),
            criterion::BatchSize::SmallInput,
        )
    });
    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group!(benches, bench_assemble);
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
