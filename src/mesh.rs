use wgpu::util::DeviceExt;

/// The two shapes the scene knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Plane,
    Cube,
}

impl MeshKind {
    pub fn data(&self) -> &'static MeshData {
        match self {
            MeshKind::Plane => &PLANE,
            MeshKind::Cube => &CUBE,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.data().indices.len() as u32
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeshKind::Plane => "plane",
            MeshKind::Cube => "cube",
        }
    }
}

pub struct MeshData {
    pub positions: &'static [[f32; 3]],
    pub tex_coords: &'static [[f32; 2]],
    pub indices: &'static [u16],
}

impl MeshData {
    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions
            .iter()
            .zip(self.tex_coords.iter())
            .map(|(position, tex_coords)| ModelVertex {
                position: *position,
                tex_coords: *tex_coords,
            })
            .collect()
    }
}

// Unit quad in the XZ plane, facing up
#[rustfmt::skip]
pub static PLANE: MeshData = MeshData {
    positions: &[
        [-1.0, 0.0,  1.0],
        [ 1.0, 0.0,  1.0],
        [ 1.0, 0.0, -1.0],
        [-1.0, 0.0, -1.0],
    ],
    tex_coords: &[
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ],
    indices: &[0, 1, 2, 0, 2, 3],
};

// Four vertices per face so every face gets the full texture
#[rustfmt::skip]
pub static CUBE: MeshData = MeshData {
    positions: &[
        // Front
        [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
        // Back
        [ 1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0],
        // Top
        [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
        // Bottom
        [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
        // Right
        [ 1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
        // Left
        [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    ],
    tex_coords: &[
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ],
    indices: &[
         0,  1,  2,      0,  2,  3,   // Front
         4,  5,  6,      4,  6,  7,   // Back
         8,  9, 10,      8, 10, 11,   // Top
        12, 13, 14,     12, 14, 15,   // Bottom
        16, 17, 18,     16, 18, 19,   // Right
        20, 21, 22,     20, 22, 23,   // Left
    ],
};


#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ModelVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}


/// GPU copy of a `MeshData`. Built once at startup and never modified.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, kind: MeshKind) -> Self {
        let data = kind.data();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertex buffer", kind.label())),
            contents: bytemuck::cast_slice(&data.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} index buffer", kind.label())),
            contents: bytemuck::cast_slice(data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_elements: kind.index_count(),
        }
    }
}
