//! Wire fixtures shared by the benchmarks.

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    fixture: Fixture,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, fixture: Fixture) -> Self {
        Self { name, group, fixture }
    }

    pub fn small(name: &'static str, fixture: Fixture) -> Self {
        Self::new(name, TestGroup::Small, fixture)
    }

    pub fn large(name: &'static str, fixture: Fixture) -> Self {
        Self::new(name, TestGroup::Large, fixture)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn wire(&self) -> &'static [u8] {
        self.fixture.wire.as_bytes()
    }
}

/// Raw bytes of one or more messages as they appear on a connection.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    label: &'static str,
    wire: &'static str,
    messages: usize,
}

impl Fixture {
    pub const fn new(label: &'static str, wire: &'static str, messages: usize) -> Self {
        Self { label, wire, messages }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn wire(&self) -> &'static str {
        self.wire
    }

    /// Number of messages the wire bytes decode into.
    pub fn messages(&self) -> usize {
        self.messages
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}

pub const GET_SMALL: Fixture = Fixture::new("get_small", "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n", 1);

pub const GET_LARGE: Fixture = Fixture::new(
    "get_large",
    concat!(
        "GET /api/v1/items?page=3&sort=desc&filter=active HTTP/1.1\r\n",
        "Host: shop.example.com\r\n",
        "User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0\r\n",
        "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8\r\n",
        "Accept-Language: en-US,en;q=0.5\r\n",
        "Accept-Encoding: gzip, deflate, br, zstd\r\n",
        "Referer: https://shop.example.com/api/v1/items?page=2&sort=desc&filter=active\r\n",
        "Cookie: session=5d41402abc4b2a76b9719d911017c592; theme=dark; consent=1; cart=item-1,item-7,item-42\r\n",
        "Cookie: tracking=off\r\n",
        "Sec-Fetch-Dest: document\r\n",
        "Sec-Fetch-Mode: navigate\r\n",
        "Sec-Fetch-Site: same-origin\r\n",
        "Upgrade-Insecure-Requests: 1\r\n",
        "Cache-Control: max-age=0\r\n",
        "Connection: keep-alive\r\n",
        "\r\n",
    ),
    1,
);

pub const POST_PIPELINED: Fixture = Fixture::new(
    "post_pipelined",
    concat!(
        "POST /login HTTP/1.1\r\nHost: localhost\r\nContent-Length: 27\r\n\r\nuser=admin&password=secret1",
        "POST /login HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\n\r\n",
        "a\r\nuser=guest\r\n11\r\n&password=secret2\r\n0\r\n\r\n",
        "GET /logout HTTP/1.1\r\nHost: localhost\r\n\r\n",
    ),
    3,
);

pub const CHUNKED_RESPONSE: Fixture = Fixture::new(
    "chunked_response",
    concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: application/json\r\n",
        "Transfer-Encoding: chunked\r\n",
        "Trailer: Server-Timing\r\n",
        "\r\n",
        "1c\r\n{\"items\":[{\"id\":1},{\"id\":2},\r\n",
        "1e\r\n{\"id\":3},{\"id\":4},{\"id\":5}]}  \r\n",
        "0\r\n",
        "Server-Timing: db;dur=53\r\n",
        "\r\n",
    ),
    1,
);
