//! Geometry records produced by the parser, and the sink that receives them.

use std::fmt;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Normal {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A point in the parameter space of a curve or surface.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Parameter {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

/// One corner of a face. Indices are 1-based as written in the file; 0
/// means the index was left out. A negative (relative) index keeps its
/// two's complement bits, so `index as i64` gives it back.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct IndexTriplet {
    pub position: u64,
    pub texture: u64,
    pub normal: u64,
}

impl IndexTriplet {
    pub fn new(position: u64, texture: u64, normal: u64) -> Self {
        IndexTriplet {
            position,
            texture,
            normal,
        }
    }
}

/// Receives geometry in the order it appears in the source.
pub trait GeometrySink {
    fn on_vertex(&mut self, vertex: Vertex);
    fn on_texture(&mut self, texture: TexCoord);
    fn on_normal(&mut self, normal: Normal);
    fn on_parameter(&mut self, parameter: Parameter);
    /// The slice is only valid for the duration of the call.
    fn on_face(&mut self, indices: &[IndexTriplet]);
}

impl<S: GeometrySink + ?Sized> GeometrySink for &mut S {
    fn on_vertex(&mut self, vertex: Vertex) {
        (**self).on_vertex(vertex)
    }

    fn on_texture(&mut self, texture: TexCoord) {
        (**self).on_texture(texture)
    }

    fn on_normal(&mut self, normal: Normal) {
        (**self).on_normal(normal)
    }

    fn on_parameter(&mut self, parameter: Parameter) {
        (**self).on_parameter(parameter)
    }

    fn on_face(&mut self, indices: &[IndexTriplet]) {
        (**self).on_face(indices)
    }
}

/// An owned copy of one sink call.
#[derive(Debug, PartialEq, Clone)]
pub enum Event {
    Vertex(Vertex),
    Texture(TexCoord),
    Normal(Normal),
    Parameter(Parameter),
    Face(Vec<IndexTriplet>),
}

/// Records every event, in order.
impl GeometrySink for Vec<Event> {
    fn on_vertex(&mut self, vertex: Vertex) {
        self.push(Event::Vertex(vertex));
    }

    fn on_texture(&mut self, texture: TexCoord) {
        self.push(Event::Texture(texture));
    }

    fn on_normal(&mut self, normal: Normal) {
        self.push(Event::Normal(normal));
    }

    fn on_parameter(&mut self, parameter: Parameter) {
        self.push(Event::Parameter(parameter));
    }

    fn on_face(&mut self, indices: &[IndexTriplet]) {
        self.push(Event::Face(indices.to_vec()));
    }
}

/// Running totals of what a parse has seen so far.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Statistics {
    pub vertices: u64,
    pub textures: u64,
    pub normals: u64,
    pub parameters: u64,
    pub faces: u64,
    /// Corners over all faces.
    pub face_indices: u64,
    /// Statements whose bodies were thrown away (groups, materials, ...).
    pub skipped: u64,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} texture coordinates, {} normals, {} parameters, \
             {} faces ({} indices), {} skipped statements",
            self.vertices,
            self.textures,
            self.normals,
            self.parameters,
            self.faces,
            self.face_indices,
            self.skipped
        )
    }
}

// Events print as the OBJ statement that would produce them, and lex back
// to the same values.

/// Prints a coordinate using the shortest digits that read back to the
/// same f32. Magnitudes outside [1e-5, 1e7) use exponent notation, which
/// keeps them short.
struct Coord(f32);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let x = self.0;
        let magnitude = x.abs();

        if x == 0.0 && x.is_sign_negative() {
            // "-0" would lex as the integer 0
            f.write_str("-0.0")
        } else if magnitude != 0.0 && magnitude.is_finite() && !(1e-5..1e7).contains(&magnitude) {
            write!(f, "{:e}", x)
        } else {
            write!(f, "{}", x)
        }
    }
}

/// Relative indices print with their sign.
fn signed(index: u64) -> i64 {
    index as i64
}

impl fmt::Display for IndexTriplet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", signed(self.position))?;
        if self.texture != 0 || self.normal != 0 {
            f.write_str("/")?;
            if self.texture != 0 {
                write!(f, "{}", signed(self.texture))?;
            }
        }
        if self.normal != 0 {
            write!(f, "/{}", signed(self.normal))?;
        }
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Vertex(v) => write!(
                f,
                "v {} {} {} {}",
                Coord(v.x),
                Coord(v.y),
                Coord(v.z),
                Coord(v.w)
            ),
            Event::Texture(t) => write!(f, "vt {} {} {}", Coord(t.u), Coord(t.v), Coord(t.w)),
            Event::Normal(n) => write!(f, "vn {} {} {}", Coord(n.x), Coord(n.y), Coord(n.z)),
            Event::Parameter(p) => write!(f, "vp {} {} {}", Coord(p.u), Coord(p.v), Coord(p.w)),
            Event::Face(indices) => {
                f.write_str("f")?;
                for triplet in indices {
                    write!(f, " {}", triplet)?;
                }
                Ok(())
            }
        }
    }
}
