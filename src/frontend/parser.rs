use super::errs::{Error, ErrorKind, Item, ParseResult};
use super::lexer::{CharacterCursor, Lexer, Token, TokenKind};
use super::options::Options;
use crate::geometry::{
    GeometrySink, IndexTriplet, Normal, Parameter, Statistics, TexCoord, Vertex,
};

pub struct Parser<C, S> {
    lexer: Lexer<C>,
    sink: S,
    options: Options,
    stats: Statistics,

    // Reused from face to face
    face_indices: Vec<IndexTriplet>,
}

impl<C: CharacterCursor, S: GeometrySink> Parser<C, S> {
    /// Creates a parser that reads from `lexer` and reports to `sink`. The
    /// parser follows the lexer's options.
    pub fn new(lexer: Lexer<C>, sink: S) -> Self {
        Parser {
            options: lexer.options(),
            lexer,
            sink,
            stats: Statistics::default(),
            face_indices: vec![],
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    // ---- Simple token-based operations ----

    /// The last consumed token
    pub fn current(&self) -> &Token {
        self.lexer.current()
    }

    /// The first unconsumed token
    pub fn peek(&self) -> ParseResult<&Token> {
        self.lexer.peek()
    }

    /// Advances the stream by one token
    pub fn advance(&mut self) -> ParseResult<&Token> {
        self.lexer.advance()
    }

    /// Checks whether or not the next token has the given kind
    pub fn check(&self, kind: TokenKind) -> ParseResult<bool> {
        Ok(self.peek()?.kind == kind)
    }

    /// Checks whether or not the next token has the given kind,
    /// and if so, consumes it, returning true.
    pub fn try_consume(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes the next token, returning an error if it isn't of the
    /// expected kind.
    pub fn expect(&mut self, expected: TokenKind, item: Item) -> ParseResult<&Token> {
        let token = self.lexer.advance()?;

        if token.kind == expected {
            Ok(token)
        } else {
            let kind = ErrorKind::ExpectedToken {
                expected,
                found: token.kind,
                item,
            };
            Err(Error::new(kind, token.position))
        }
    }

    // ---- parsing methods ----

    /// Reads statements until the end of the input, feeding the sink as
    /// it goes.
    #[tracing::instrument(skip_all)]
    pub fn parse(&mut self) -> ParseResult<()> {
        loop {
            let (kind, position, starts_statement) = {
                let token = self.advance()?;
                (token.kind, token.position, token.starts_statement)
            };

            match kind {
                TokenKind::Vertex => self.parse_vertex()?,
                TokenKind::Texture => self.parse_texture()?,
                TokenKind::Normal => self.parse_normal()?,
                TokenKind::Parameter => self.parse_parameter()?,
                TokenKind::Face => self.parse_face()?,
                TokenKind::EndOfStatement => {}
                TokenKind::EndOfFile => break,
                TokenKind::Error => return Err(Error::new(ErrorKind::InvalidToken, position)),

                // The lexer already threw away the rest of these lines
                TokenKind::Object
                | TokenKind::Group
                | TokenKind::Material
                | TokenKind::UseMaterial
                | TokenKind::Smoothing => self.stats.skipped += 1,
                TokenKind::String if starts_statement => {
                    if !self.options.skip_unknown_statements {
                        let name = self.current().lexeme.clone();
                        return Err(Error::new(ErrorKind::UnknownStatement(name), position));
                    }
                    self.stats.skipped += 1;
                }

                // Leftovers from the end of a statement
                TokenKind::String | TokenKind::Integer | TokenKind::Float | TokenKind::Separator => {
                    if self.options.reject_trailing_tokens {
                        return Err(Error::new(ErrorKind::ExpectedStatement(kind), position));
                    }
                }
            }
        }

        tracing::debug!(stats = %self.stats, "parse finished");
        Ok(())
    }

    fn parse_vertex(&mut self) -> ParseResult<()> {
        self.stats.vertices += 1;

        let vertex = Vertex {
            x: self.parse_component("x", Item::Vertex)?,
            y: self.parse_component("y", Item::Vertex)?,
            z: self.parse_component("z", Item::Vertex)?,
            w: self.try_parse_float()?.unwrap_or(1.0),
        };
        self.finish_statement(Item::Vertex)?;

        tracing::trace!(?vertex, "vertex");
        self.sink.on_vertex(vertex);
        Ok(())
    }

    fn parse_texture(&mut self) -> ParseResult<()> {
        self.stats.textures += 1;

        let texture = TexCoord {
            u: self.parse_component("u", Item::Texture)?,
            v: self.parse_component("v", Item::Texture)?,
            w: self.try_parse_float()?.unwrap_or(1.0),
        };
        self.finish_statement(Item::Texture)?;

        tracing::trace!(?texture, "texture");
        self.sink.on_texture(texture);
        Ok(())
    }

    fn parse_normal(&mut self) -> ParseResult<()> {
        self.stats.normals += 1;

        let normal = Normal {
            x: self.parse_component("x", Item::Normal)?,
            y: self.parse_component("y", Item::Normal)?,
            z: self.parse_component("z", Item::Normal)?,
        };
        self.finish_statement(Item::Normal)?;

        tracing::trace!(?normal, "normal");
        self.sink.on_normal(normal);
        Ok(())
    }

    fn parse_parameter(&mut self) -> ParseResult<()> {
        self.stats.parameters += 1;

        let u = self.parse_component("u", Item::Parameter)?;
        let v = self.try_parse_float()?;
        // w is only looked for when v was there
        let w = match v {
            Some(_) => self.try_parse_float()?,
            None => None,
        };
        let parameter = Parameter {
            u,
            v: v.unwrap_or(0.0),
            w: w.unwrap_or(0.0),
        };
        self.finish_statement(Item::Parameter)?;

        tracing::trace!(?parameter, "parameter");
        self.sink.on_parameter(parameter);
        Ok(())
    }

    fn parse_face(&mut self) -> ParseResult<()> {
        self.stats.faces += 1;
        let position = self.current().position;

        self.face_indices.clear();
        while let Some(triplet) = self.parse_face_indices()? {
            self.face_indices.push(triplet);
        }

        let count = self.face_indices.len();
        if self.options.strict && count < 2 {
            return Err(Error::new(ErrorKind::DegenerateFace(count), position));
        }
        self.finish_statement(Item::Face)?;
        self.stats.face_indices += count as u64;

        tracing::trace!(indices = ?self.face_indices, "face");
        self.sink.on_face(&self.face_indices);
        Ok(())
    }

    /// Parses one `v`, `v/vt`, `v//vn` or `v/vt/vn` group. Returns None,
    /// having consumed nothing, if there's no position index to start one.
    fn parse_face_indices(&mut self) -> ParseResult<Option<IndexTriplet>> {
        let position = match self.try_parse_integer()? {
            Some(i) => i,
            None => return Ok(None),
        };

        // A separator with no index after it leaves that index out
        let texture = if self.try_consume(TokenKind::Separator)? {
            self.try_parse_integer()?.unwrap_or(0)
        } else {
            0
        };
        let normal = if self.try_consume(TokenKind::Separator)? {
            self.try_parse_integer()?.unwrap_or(0)
        } else {
            0
        };

        Ok(Some(IndexTriplet::new(position, texture, normal)))
    }

    // ---- field helpers ----

    /// Consumes a numeric literal if there is one, widening integers.
    fn try_parse_float(&mut self) -> ParseResult<Option<f32>> {
        match self.peek()?.kind {
            TokenKind::Float | TokenKind::Integer => Ok(self.advance()?.as_float()),
            _ => Ok(None),
        }
    }

    /// Consumes an integer literal if there is one. Negative (relative)
    /// indices keep their bits, so `as i64` recovers them.
    fn try_parse_integer(&mut self) -> ParseResult<Option<u64>> {
        if self.check(TokenKind::Integer)? {
            Ok(self.advance()?.as_integer().map(|i| i as u64))
        } else {
            Ok(None)
        }
    }

    /// Reads a coordinate the statement can't do without. Outside strict
    /// mode, a missing one reads as zero.
    fn parse_component(&mut self, component: &'static str, item: Item) -> ParseResult<f32> {
        if let Some(value) = self.try_parse_float()? {
            return Ok(value);
        }

        if !self.options.strict {
            return Ok(0.0);
        }

        let found = self.peek()?;
        let kind = ErrorKind::MissingComponent {
            component,
            item,
            found: found.kind,
        };
        Err(Error::new(kind, found.position))
    }

    /// Statements end at a newline, a comment, or the end of the file.
    /// Anything else left on the line is ignored, unless trailing tokens
    /// are rejected.
    fn finish_statement(&mut self, item: Item) -> ParseResult<()> {
        if !self.options.reject_trailing_tokens || self.check(TokenKind::EndOfFile)? {
            return Ok(());
        }

        self.expect(TokenKind::EndOfStatement, item)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::errs::Category;
    use super::super::lexer::{Keywords, StrCursor};
    use super::super::span::CodePosition;
    use super::*;
    use crate::geometry::Event;

    fn parse_with(source: &str, options: Options) -> ParseResult<Vec<Event>> {
        let lexer = Lexer::with_options(StrCursor::new(source), Keywords::obj(), options);
        let mut parser = Parser::new(lexer, vec![]);
        parser.parse()?;
        Ok(parser.into_sink())
    }

    fn parse(source: &str) -> Vec<Event> {
        parse_with(source, Options::default()).expect("source should parse")
    }

    fn parse_lenient(source: &str) -> Vec<Event> {
        parse_with(source, Options::lenient()).expect("source should parse")
    }

    fn parse_err(source: &str) -> Error {
        parse_with(source, Options::default()).expect_err("source should not parse")
    }

    fn parse_pedantic_err(source: &str) -> Error {
        parse_with(source, Options::pedantic()).expect_err("source should not parse")
    }

    fn vertex(x: f32, y: f32, z: f32, w: f32) -> Event {
        Event::Vertex(Vertex { x, y, z, w })
    }

    fn texture(u: f32, v: f32, w: f32) -> Event {
        Event::Texture(TexCoord { u, v, w })
    }

    fn normal(x: f32, y: f32, z: f32) -> Event {
        Event::Normal(Normal { x, y, z })
    }

    fn parameter(u: f32, v: f32, w: f32) -> Event {
        Event::Parameter(Parameter { u, v, w })
    }

    fn face(indices: &[(u64, u64, u64)]) -> Event {
        Event::Face(
            indices
                .iter()
                .map(|&(p, t, n)| IndexTriplet::new(p, t, n))
                .collect(),
        )
    }

    #[test]
    fn vertex_defaults_w() {
        assert_eq!(parse("v 1.0 2.0 3.0\n"), vec![vertex(1.0, 2.0, 3.0, 1.0)]);
        assert_eq!(parse("v 1 -2 3.5 0.25\n"), vec![vertex(1.0, -2.0, 3.5, 0.25)]);
        assert_eq!(parse("v 1 2 3"), vec![vertex(1.0, 2.0, 3.0, 1.0)]);
    }

    #[test]
    fn texture_defaults_w() {
        assert_eq!(parse("vt 0.5 0.25\n"), vec![texture(0.5, 0.25, 1.0)]);
        assert_eq!(parse("vt 0.5 0.25 0.75\n"), vec![texture(0.5, 0.25, 0.75)]);
    }

    #[test]
    fn normals() {
        assert_eq!(parse("vn 0 1 0\n"), vec![normal(0.0, 1.0, 0.0)]);
        assert_eq!(parse("vn -0.5 .5 1e0\n"), vec![normal(-0.5, 0.5, 1.0)]);
    }

    #[test]
    fn parameters() {
        assert_eq!(parse("vp 0.5\n"), vec![parameter(0.5, 0.0, 0.0)]);
        assert_eq!(parse("vp 0.5 0.25\n"), vec![parameter(0.5, 0.25, 0.0)]);
        assert_eq!(parse("vp 0.5 0.25 2\n"), vec![parameter(0.5, 0.25, 2.0)]);
    }

    #[test]
    fn parameter_stops_after_missing_v() {
        // With v missing, w is never looked for, so the stray separator is
        // left over for the top-level loop to ignore
        assert_eq!(parse_lenient("vp 1 / 3\n"), vec![parameter(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn faces() {
        assert_eq!(
            parse("f 1/2/3 4//6 7\n"),
            vec![face(&[(1, 2, 3), (4, 0, 6), (7, 0, 0)])]
        );
        assert_eq!(
            parse("f 1/1 2/2 3/3 4/4\n"),
            vec![face(&[(1, 1, 0), (2, 2, 0), (3, 3, 0), (4, 4, 0)])]
        );
        // Whitespace doesn't end a group, so a dangling separator takes
        // the next position as its index
        assert_eq!(parse_lenient("f 1// 2\n"), vec![face(&[(1, 0, 2)])]);
    }

    #[test]
    fn relative_face_indices() {
        let events = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf -1/-2 -2 -3//-4\nf 1 2 3\n");

        let relative = match &events[4] {
            Event::Face(indices) => indices,
            other => panic!("unexpected event {:?}", other),
        };
        let signed: Vec<_> = relative
            .iter()
            .map(|t| (t.position as i64, t.texture as i64, t.normal as i64))
            .collect();
        assert_eq!(signed, vec![(-1, -2, 0), (-2, 0, 0), (-3, 0, -4)]);

        assert_ne!(events[4], events[5]);
        assert_eq!(events[5], face(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)]));
    }

    #[test]
    fn face_index_count_matches_groups() {
        for n in 2..12 {
            let groups: Vec<String> = (1..=n).map(|i| format!("{}/{}/{}", i, i + 1, i + 2)).collect();
            let source = format!("f {}\n", groups.join(" "));

            match &parse(&source)[..] {
                [Event::Face(indices)] => assert_eq!(indices.len(), n),
                other => panic!("unexpected events {:?}", other),
            }
        }
    }

    #[test]
    fn skipped_statements() {
        let source = "g groupname\nv 1 2 3\n";
        assert_eq!(parse(source), vec![vertex(1.0, 2.0, 3.0, 1.0)]);

        let source = "mtllib cube.mtl\no cube\nusemtl red_paint\ns 1\nl 1 2\nv 0 0 0\n";
        let lexer = Lexer::new(StrCursor::new(source));
        let mut parser = Parser::new(lexer, vec![]);
        parser.parse().unwrap();
        assert_eq!(parser.statistics().skipped, 5);
        assert_eq!(parser.statistics().vertices, 1);
        assert_eq!(parser.sink().len(), 1);
    }

    #[test]
    fn events_in_document_order() {
        let source = "\
# a square
v 0 0 0
v 1 0 0
vt 0 0

vn 0 0 1
v 1 1 0
f 1/1/1 2/1/1 3/1/1
vp 0.5
";
        let events = parse(source);
        let rendered: Vec<String> = events.iter().map(Event::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "v 0 0 0 1",
                "v 1 0 0 1",
                "vt 0 0 1",
                "vn 0 0 1",
                "v 1 1 0 1",
                "f 1/1/1 2/1/1 3/1/1",
                "vp 0.5 0 0",
            ]
        );
    }

    #[test]
    fn statistics() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2\n";
        let lexer = Lexer::new(StrCursor::new(source));
        let mut parser = Parser::new(lexer, vec![]);
        parser.parse().unwrap();

        let stats = parser.statistics();
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.normals, 1);
        assert_eq!(stats.faces, 2);
        assert_eq!(stats.face_indices, 5);
        assert_eq!(stats.textures, 0);
    }

    fn coordinates(event: &Event) -> Vec<f32> {
        match event {
            Event::Vertex(v) => vec![v.x, v.y, v.z, v.w],
            Event::Texture(t) => vec![t.u, t.v, t.w],
            Event::Normal(n) => vec![n.x, n.y, n.z],
            Event::Parameter(p) => vec![p.u, p.v, p.w],
            Event::Face(_) => vec![],
        }
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let source = "\
v 1.0 2.0 3.0
v 0.1 -12.25 3.14159 1e-20
v 1e30 -3.4e38 0.00000000000000000001 0.000000000000000000015
vt 0.333333 0.5 1.5e-20
vn 1e-3 -7.5e2 9999999
vn 1e7 -0.0 0.00001
vp 2.5e12 -4e-7 6.02e23
f 1/2/3 -1//-2 7/8
";
        let first = parse(source);
        assert_eq!(
            first[2],
            vertex(1e30, -3.4e38, 1e-20, 1.5e-20),
            "tiny and huge literals should keep their value"
        );

        let rendered: Vec<String> = first.iter().map(Event::to_string).collect();
        let second = parse(&rendered.join("\n"));

        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            let a_bits: Vec<u32> = coordinates(a).iter().map(|x| x.to_bits()).collect();
            let b_bits: Vec<u32> = coordinates(b).iter().map(|x| x.to_bits()).collect();
            assert_eq!(a_bits, b_bits, "{} vs {}", a, b);
        }
    }

    #[test]
    fn lexical_error_is_fatal() {
        let err = parse_err("v 1 2 3\nv 4 $ 6\n");
        assert_eq!(err.category(), Category::Lexical);
        assert_eq!(err.kind, ErrorKind::UnexpectedCharacter('$'));
        assert_eq!(err.position, CodePosition::new(2, 5));
    }

    #[test]
    fn missing_components() {
        let err = parse_err("v 1 2 3\nvn 1 2\n");
        assert_eq!(err.category(), Category::Syntax);
        assert_eq!(
            err.kind,
            ErrorKind::MissingComponent {
                component: "z",
                item: Item::Normal,
                found: TokenKind::EndOfStatement,
            }
        );
        assert_eq!(err.position, CodePosition::new(2, 7));

        let err = parse_err("vt\n");
        assert!(matches!(
            err.kind,
            ErrorKind::MissingComponent {
                component: "u",
                item: Item::Texture,
                ..
            }
        ));

        // Lenient mode starts each record from zero
        assert_eq!(
            parse_lenient("vn 4 5 6\nvn 1 2\n"),
            vec![normal(4.0, 5.0, 6.0), normal(1.0, 2.0, 0.0)]
        );
        assert_eq!(parse_lenient("v\n"), vec![vertex(0.0, 0.0, 0.0, 1.0)]);
    }

    #[test]
    fn trailing_tokens() {
        // Ignored by default
        assert_eq!(parse("v 1 2 3 4 5\n"), vec![vertex(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(
            parse("v 1 2 3 4 5 six\nf 1 2 x\n"),
            vec![vertex(1.0, 2.0, 3.0, 4.0), face(&[(1, 0, 0), (2, 0, 0)])]
        );

        let err = parse_pedantic_err("v 1 2 3 4 5\n");
        assert_eq!(
            err.kind,
            ErrorKind::ExpectedToken {
                expected: TokenKind::EndOfStatement,
                found: TokenKind::Integer,
                item: Item::Vertex,
            }
        );
        assert_eq!(err.position, CodePosition::new(1, 11));

        let err = parse_pedantic_err("f 1 2 x\n");
        assert!(matches!(err.kind, ErrorKind::ExpectedToken { item: Item::Face, .. }));
    }

    #[test]
    fn degenerate_faces() {
        let err = parse_err("f 1\n");
        assert_eq!(err.kind, ErrorKind::DegenerateFace(1));
        assert_eq!(err.position, CodePosition::new(1, 1));

        assert_eq!(parse_err("v 0 0 0\nf\n").kind, ErrorKind::DegenerateFace(0));

        assert_eq!(parse_lenient("f\nf 3\n"), vec![face(&[]), face(&[(3, 0, 0)])]);
    }

    #[test]
    fn stray_literals() {
        assert_eq!(parse("1 2 3\nv 1 2 3\n"), vec![vertex(1.0, 2.0, 3.0, 1.0)]);
        assert_eq!(parse_lenient("/ 1 2\nv 1 2 3\n"), vec![vertex(1.0, 2.0, 3.0, 1.0)]);

        let err = parse_pedantic_err("1 2 3\n");
        assert_eq!(err.kind, ErrorKind::ExpectedStatement(TokenKind::Integer));
        assert_eq!(err.position, CodePosition::new(1, 1));
    }

    #[test]
    fn unknown_statements() {
        assert_eq!(parse("cstype bspline\ndeg 3\nv 1 2 3\n").len(), 1);

        let options = Options {
            skip_unknown_statements: false,
            ..Options::default()
        };
        let err = parse_with("v 1 2 3\nl 1 2\n", options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownStatement("l".to_owned()));
        assert_eq!(err.position, CodePosition::new(2, 1));
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("\n\n# nothing here\n"), vec![]);
    }

    #[test]
    fn pull_interface() {
        let lexer = Lexer::new(StrCursor::new("f 1/2"));
        let mut parser = Parser::new(lexer, vec![]);

        assert_eq!(parser.advance().unwrap().kind, TokenKind::Face);
        assert_eq!(parser.current().kind, TokenKind::Face);
        assert!(!parser.try_consume(TokenKind::Separator).unwrap());
        assert_eq!(parser.expect(TokenKind::Integer, Item::Face).unwrap().as_integer(), Some(1));
        assert!(parser.try_consume(TokenKind::Separator).unwrap());

        let err = parser.expect(TokenKind::Separator, Item::Face).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ExpectedToken {
                expected: TokenKind::Separator,
                found: TokenKind::Integer,
                item: Item::Face,
            }
        );
        assert_eq!(parser.peek().unwrap().kind, TokenKind::EndOfFile);
    }
}
