use vte::{Params, Perform};

/// Events the parser emits from a byte stream. Each variant corresponds
/// exactly to the VT500-style state machine's dispatch points; the parser
/// has no knowledge of Grid/State and cannot mutate them — it only
/// classifies bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A complete Unicode scalar, after UTF-8 reassembly.
    Print(char),
    /// A C0 control byte (0x00-0x1F, 0x7F) encountered in Ground.
    Execute(u8),
    Csi {
        private: Option<char>,
        params: Vec<Vec<i64>>,
        intermediates: Vec<u8>,
        action: char,
    },
    /// Contents between `ESC ]` and `BEL` or `ESC \` (ST).
    Osc { data: Vec<Vec<u8>>, bell_terminated: bool },
    Dcs {
        params: Vec<Vec<i64>>,
        intermediates: Vec<u8>,
        action: char,
        data: Vec<u8>,
    },
    Esc { intermediates: Vec<u8>, action: u8 },
}

/// Sink that receives parser events in emission order.
pub trait EventSink {
    fn on_event(&mut self, event: Event);
}

impl<F: FnMut(Event)> EventSink for F {
    fn on_event(&mut self, event: Event) {
        (self)(event)
    }
}

fn params_to_vec(params: &Params) -> Vec<Vec<i64>> {
    params
        .iter()
        .map(|group| group.iter().map(|&v| v as i64).collect())
        .collect()
}

/// Extracts the DEC-private marker byte (`<`, `=`, `>`, `?`), if present,
/// from the intermediates vte hands us for a CSI sequence.
fn private_marker(intermediates: &[u8]) -> Option<char> {
    intermediates
        .first()
        .filter(|b| matches!(b, b'<' | b'=' | b'>' | b'?'))
        .map(|&b| b as char)
}

#[derive(Default)]
struct DcsAccum {
    params: Vec<Vec<i64>>,
    intermediates: Vec<u8>,
    action: char,
    data: Vec<u8>,
}

struct EventCollector<'a> {
    sink: &'a mut dyn EventSink,
    dcs: &'a mut Option<DcsAccum>,
}

impl<'a> Perform for EventCollector<'a> {
    fn print(&mut self, c: char) {
        self.sink.on_event(Event::Print(c));
    }

    fn execute(&mut self, byte: u8) {
        self.sink.on_event(Event::Execute(byte));
    }

    fn hook(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        *self.dcs = Some(DcsAccum {
            params: params_to_vec(params),
            intermediates: intermediates.to_vec(),
            action,
            data: Vec::new(),
        });
    }

    fn put(&mut self, byte: u8) {
        if let Some(accum) = self.dcs.as_mut() {
            accum.data.push(byte);
        }
    }

    fn unhook(&mut self) {
        if let Some(accum) = self.dcs.take() {
            self.sink.on_event(Event::Dcs {
                params: accum.params,
                intermediates: accum.intermediates,
                action: accum.action,
                data: accum.data,
            });
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], bell_terminated: bool) {
        self.sink.on_event(Event::Osc {
            data: params.iter().map(|p| p.to_vec()).collect(),
            bell_terminated,
        });
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        let private = private_marker(intermediates);
        let rest: Vec<u8> = intermediates
            .iter()
            .skip(if private.is_some() { 1 } else { 0 })
            .copied()
            .collect();
        self.sink.on_event(Event::Csi {
            private,
            params: params_to_vec(params),
            intermediates: rest,
            action,
        });
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        self.sink.on_event(Event::Esc {
            intermediates: intermediates.to_vec(),
            action: byte,
        });
    }
}

/// Byte-driven VT state machine. All state lives in the wrapped
/// `vte::Parser`, so escape sequences split across arbitrary read
/// boundaries are handled correctly across calls to `feed`.
pub struct Parser {
    inner: vte::Parser,
    dcs: Option<DcsAccum>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            inner: vte::Parser::new(),
            dcs: None,
        }
    }

    pub fn feed(&mut self, bytes: &[u8], sink: &mut dyn EventSink) {
        let mut collector = EventCollector {
            sink,
            dcs: &mut self.dcs,
        };
        for &byte in bytes {
            self.inner.advance(&mut collector, byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8]) -> Vec<Event> {
        let mut parser = Parser::new();
        let mut events = Vec::new();
        parser.feed(bytes, &mut |e| events.push(e));
        events
    }

    #[test]
    fn prints_plain_ascii() {
        let events = collect(b"Hi");
        assert_eq!(events, vec![Event::Print('H'), Event::Print('i')]);
    }

    #[test]
    fn reassembles_utf8_across_bytes() {
        // "é" = 0xC3 0xA9
        let events = collect(&[0xC3, 0xA9]);
        assert_eq!(events, vec![Event::Print('é')]);
    }

    #[test]
    fn invalid_utf8_yields_replacement_character() {
        let events = collect(&[0xFF]);
        assert_eq!(events, vec![Event::Print('\u{FFFD}')]);
    }

    #[test]
    fn split_chunk_csi_produces_one_event() {
        let mut parser = Parser::new();
        let mut events = Vec::new();
        for chunk in [&b"\x1b["[..], b"3", b"1m", b"Z"] {
            parser.feed(chunk, &mut |e| events.push(e));
        }
        assert_eq!(
            events,
            vec![
                Event::Csi {
                    private: None,
                    params: vec![vec![31]],
                    intermediates: vec![],
                    action: 'm',
                },
                Event::Print('Z'),
            ]
        );
    }

    #[test]
    fn osc_terminated_by_bel_or_st_is_equivalent() {
        let bel = collect(b"\x1b]0;title\x07");
        let st = collect(b"\x1b]0;title\x1b\\");
        assert_eq!(bel, st);
    }

    #[test]
    fn csi_private_marker_is_extracted() {
        let events = collect(b"\x1b[?25h");
        assert_eq!(
            events,
            vec![Event::Csi {
                private: Some('?'),
                params: vec![vec![25]],
                intermediates: vec![],
                action: 'h',
            }]
        );
    }
}
